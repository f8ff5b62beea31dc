use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Closed taxonomy of domain failures. Every core operation either returns
/// its documented success value or exactly one of these; none is retriable
/// without the caller changing input or state first.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    #[error("user already has an active game")]
    ActiveGameAlreadyExists,
    #[error("the game does not exist")]
    GameNotFound,
    #[error("the round does not exist")]
    RoundNotFound,
    #[error("round is not in the required state")]
    InvalidRoundState,
    #[error("the caption does not exist")]
    CaptionNotFound,
    #[error("no content available in the catalog")]
    NoContentAvailable,
    /// Persistence failure below the core. Deliberately outside the domain
    /// taxonomy; callers must not match on the message.
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl GameError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
