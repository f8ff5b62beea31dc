use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A registered player. Credentials live in the persistence layer and are
/// never carried here; the core only ever sees the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
