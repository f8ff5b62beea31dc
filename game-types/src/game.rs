use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::content::{Caption, CaptionId, Meme, MemeId};

pub type GameId = i64;
pub type RoundId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameStatus {
    Active,   // Game in progress, one round awaiting an answer
    Finished, // Explicitly closed; immutable except for historical reads
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RoundState {
    Pending,  // Created, not yet shown to the player
    Active,   // Shown, accepting exactly one answer
    Resolved, // Answer recorded or timed out; terminal
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Round {
    pub id: RoundId,
    pub game_id: GameId,
    pub meme_id: MemeId,
    /// Candidate captions in presentation order. Fixed when the round is
    /// created and never reshuffled.
    pub caption_ids: Vec<CaptionId>,
    pub state: RoundState,
    pub score: i32,
    /// `None` until resolved, and still `None` when the round timed out
    /// without an answer.
    pub chosen_caption_id: Option<CaptionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Game {
    pub id: GameId,
    pub username: String,
    pub score: i32,
    pub status: GameStatus,
    /// Round ids in play order. Length is fixed at creation.
    pub round_ids: Vec<RoundId>,
    pub created_at: String, // ISO 8601 string
}

impl Game {
    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }
}

/// Outcome of resolving a single round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundOutcome {
    pub correct: bool,
    pub score: i32,
}

/// Single-round play for unauthenticated visitors. Never persisted; the
/// round travels inline with its full caption records, and scoring stays
/// client-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuestGame {
    pub score: i32,
    pub status: GameStatus,
    pub round: GuestRound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuestRound {
    pub meme: Meme,
    pub captions: Vec<Caption>,
    pub state: RoundState,
}
