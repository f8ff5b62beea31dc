use std::sync::Arc;

use tracing::debug;

use game_types::{
    CaptionId, GameError, GameId, GameResult, MemeId, Round, RoundId, RoundOutcome, RoundState,
};

use crate::catalog::ContentCatalog;
use crate::store::{ContentStore, RoundStore};

/// Points awarded for a correctly answered round.
pub const ROUND_SCORE: i32 = 5;

/// Drives a single round through Pending -> Active -> Resolved. Enforces the
/// per-round transitions only; "exactly one Active round per game" is the
/// session manager's job.
pub struct RoundManager {
    store: Arc<dyn RoundStore>,
}

impl RoundManager {
    pub fn new(store: Arc<dyn RoundStore>) -> Self {
        Self { store }
    }

    /// Create a Pending round for `game_id` over `meme_id`. The candidate
    /// captions are assembled here once and never regenerated.
    pub async fn create_round(
        &self,
        catalog: &ContentCatalog,
        game_id: GameId,
        meme_id: MemeId,
    ) -> GameResult<Round> {
        let captions = catalog.candidate_captions(meme_id).await?;
        let caption_ids = captions.into_iter().map(|caption| caption.id).collect();
        let round = self.store.insert_round(game_id, meme_id, caption_ids).await?;
        debug!(round_id = round.id, game_id, meme_id, "round created");
        Ok(round)
    }

    pub async fn round_by_id(&self, round_id: RoundId) -> GameResult<Round> {
        self.store
            .round_by_id(round_id)
            .await?
            .ok_or(GameError::RoundNotFound)
    }

    /// Pending -> Active.
    pub async fn activate(&self, round_id: RoundId) -> GameResult<()> {
        let round = self.round_by_id(round_id).await?;
        if round.state != RoundState::Pending {
            return Err(GameError::InvalidRoundState);
        }
        self.store.set_round_state(round_id, RoundState::Active).await
    }

    /// Active -> Resolved. A `None` answer records a timeout: score 0,
    /// correct=false, and no caption stored. "No answer" is a resolution
    /// value of its own, distinct from answering incorrectly.
    pub async fn resolve(
        &self,
        content: &dyn ContentStore,
        round_id: RoundId,
        chosen: Option<CaptionId>,
    ) -> GameResult<RoundOutcome> {
        let round = self.round_by_id(round_id).await?;
        if round.state != RoundState::Active {
            return Err(GameError::InvalidRoundState);
        }

        let outcome = match chosen {
            Some(caption_id) => {
                let caption = content
                    .caption_by_id(caption_id)
                    .await?
                    .ok_or(GameError::CaptionNotFound)?;
                let correct = caption.matches(round.meme_id);
                RoundOutcome {
                    correct,
                    score: if correct { ROUND_SCORE } else { 0 },
                }
            }
            None => RoundOutcome {
                correct: false,
                score: 0,
            },
        };

        self.store
            .record_resolution(round_id, chosen, outcome.score)
            .await?;
        debug!(
            round_id,
            correct = outcome.correct,
            score = outcome.score,
            "round resolved"
        );
        Ok(outcome)
    }
}
