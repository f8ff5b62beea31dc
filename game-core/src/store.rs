use async_trait::async_trait;

use game_types::{
    Caption, CaptionId, Game, GameId, GameResult, Meme, MemeId, Round, RoundId, RoundState,
};

/// Read-only access to the pre-seeded meme/caption catalog.
///
/// Implementations only ever fail with `GameError::Storage`; the domain
/// conditions are raised by the managers on top.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_memes(&self) -> GameResult<Vec<Meme>>;
    async fn meme_by_id(&self, meme_id: MemeId) -> GameResult<Option<Meme>>;
    /// Captions whose `correct_meme_ids` contain `meme_id`, deduplicated.
    async fn captions_for_meme(&self, meme_id: MemeId) -> GameResult<Vec<Caption>>;
    async fn list_captions(&self) -> GameResult<Vec<Caption>>;
    async fn caption_by_id(&self, caption_id: CaptionId) -> GameResult<Option<Caption>>;
}

#[async_trait]
pub trait RoundStore: Send + Sync {
    /// Persist a new round in state Pending with score 0 and no answer.
    async fn insert_round(
        &self,
        game_id: GameId,
        meme_id: MemeId,
        caption_ids: Vec<CaptionId>,
    ) -> GameResult<Round>;
    async fn round_by_id(&self, round_id: RoundId) -> GameResult<Option<Round>>;
    async fn set_round_state(&self, round_id: RoundId, state: RoundState) -> GameResult<()>;
    /// Persist a resolution: state Resolved, the earned score, and the
    /// chosen caption (kept `None` for timeouts).
    async fn record_resolution(
        &self,
        round_id: RoundId,
        chosen: Option<CaptionId>,
        score: i32,
    ) -> GameResult<()>;
}

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert a new Active game for `username` unless one already exists.
    /// Returns `None` when an Active game was found. The check and insert
    /// must be atomic at the storage layer so racing creates cannot both
    /// succeed.
    async fn try_insert_active_game(&self, username: &str) -> GameResult<Option<Game>>;
    /// Fix the game's round sequence. Called once, right after creation.
    async fn attach_rounds(&self, game_id: GameId, round_ids: &[RoundId]) -> GameResult<()>;
    async fn game_by_id(&self, game_id: GameId) -> GameResult<Option<Game>>;
    async fn add_score(&self, game_id: GameId, points: i32) -> GameResult<()>;
    /// Flip Active -> Finished. Returns false when the game was not Active.
    async fn finish_game(&self, game_id: GameId) -> GameResult<bool>;
    /// Remove the game row and, through cascade, its rounds. Rolls back a
    /// creation that failed after the insert.
    async fn delete_game(&self, game_id: GameId) -> GameResult<()>;
    async fn active_game_by_username(&self, username: &str) -> GameResult<Option<Game>>;
    /// All games owned by `username`, most recent first.
    async fn games_by_username(&self, username: &str) -> GameResult<Vec<Game>>;
}
