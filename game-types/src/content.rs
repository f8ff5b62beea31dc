use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub type MemeId = i64;
pub type CaptionId = i64;

/// One meme image in the pre-seeded catalog. `image_ref` is an opaque
/// locator resolved by the client; the server never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Meme {
    pub id: MemeId,
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Caption {
    pub id: CaptionId,
    pub text: String,
    /// Memes this caption is a correct answer for. May be empty, or list
    /// several memes.
    pub correct_meme_ids: Vec<MemeId>,
}

impl Caption {
    /// Whether this caption is a correct answer for `meme_id`.
    pub fn matches(&self, meme_id: MemeId) -> bool {
        self.correct_meme_ids.contains(&meme_id)
    }
}
