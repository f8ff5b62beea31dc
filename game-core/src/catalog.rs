use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use game_types::{Caption, GameError, GameResult, Meme, MemeId};

use crate::store::ContentStore;

/// Maximum number of correct captions offered per round.
pub const MAX_CORRECT_CAPTIONS: usize = 2;
/// Number of distractor captions offered per round.
pub const DISTRACTOR_COUNT: usize = 5;

/// Randomized selection over the fixed meme/caption catalog.
///
/// The RNG is injected so tests can pin orderings and outcomes with a seed;
/// production construction draws from entropy.
pub struct ContentCatalog {
    store: Arc<dyn ContentStore>,
    rng: Mutex<StdRng>,
}

impl ContentCatalog {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    pub fn with_rng(store: Arc<dyn ContentStore>, rng: StdRng) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &dyn ContentStore {
        &*self.store
    }

    /// Uniformly pick one meme whose id is not in `exclude`.
    pub async fn pick_random_meme(&self, exclude: &[MemeId]) -> GameResult<Meme> {
        let memes = self.store.list_memes().await?;
        let eligible: Vec<Meme> = memes
            .into_iter()
            .filter(|meme| !exclude.contains(&meme.id))
            .collect();

        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        eligible
            .choose(&mut *rng)
            .cloned()
            .ok_or(GameError::NoContentAvailable)
    }

    /// Assemble the candidate captions for one round over `meme_id`: up to
    /// `MAX_CORRECT_CAPTIONS` correct captions plus a uniform sample of
    /// `DISTRACTOR_COUNT` distinct distractors, shuffled once. The returned
    /// order is final; rounds never reshuffle.
    ///
    /// Below-minimum catalogs degrade to whatever is available. The seeder
    /// refuses catalogs that cannot fill a full candidate set, so a deployed
    /// server always serves seven.
    pub async fn candidate_captions(&self, meme_id: MemeId) -> GameResult<Vec<Caption>> {
        let mut correct = self.store.captions_for_meme(meme_id).await?;
        correct.sort_by_key(|caption| caption.id);
        correct.dedup_by_key(|caption| caption.id);

        let distractors: Vec<Caption> = self
            .store
            .list_captions()
            .await?
            .into_iter()
            .filter(|caption| !caption.matches(meme_id))
            .collect();

        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        let mut candidates: Vec<Caption> = correct
            .choose_multiple(&mut *rng, MAX_CORRECT_CAPTIONS)
            .cloned()
            .collect();
        candidates.extend(
            distractors
                .choose_multiple(&mut *rng, DISTRACTOR_COUNT)
                .cloned(),
        );
        candidates.shuffle(&mut *rng);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use game_types::CaptionId;
    use std::collections::HashSet;

    struct FixedContent {
        memes: Vec<Meme>,
        captions: Vec<Caption>,
    }

    #[async_trait]
    impl ContentStore for FixedContent {
        async fn list_memes(&self) -> GameResult<Vec<Meme>> {
            Ok(self.memes.clone())
        }

        async fn meme_by_id(&self, meme_id: MemeId) -> GameResult<Option<Meme>> {
            Ok(self.memes.iter().find(|m| m.id == meme_id).cloned())
        }

        async fn captions_for_meme(&self, meme_id: MemeId) -> GameResult<Vec<Caption>> {
            Ok(self
                .captions
                .iter()
                .filter(|c| c.matches(meme_id))
                .cloned()
                .collect())
        }

        async fn list_captions(&self) -> GameResult<Vec<Caption>> {
            Ok(self.captions.clone())
        }

        async fn caption_by_id(&self, caption_id: CaptionId) -> GameResult<Option<Caption>> {
            Ok(self.captions.iter().find(|c| c.id == caption_id).cloned())
        }
    }

    fn meme(id: MemeId) -> Meme {
        Meme {
            id,
            image_ref: format!("memes/{id}.webp"),
        }
    }

    fn caption(id: CaptionId, correct_for: &[MemeId]) -> Caption {
        Caption {
            id,
            text: format!("caption {id}"),
            correct_meme_ids: correct_for.to_vec(),
        }
    }

    fn test_catalog(memes: Vec<Meme>, captions: Vec<Caption>, seed: u64) -> ContentCatalog {
        ContentCatalog::with_rng(
            Arc::new(FixedContent { memes, captions }),
            StdRng::seed_from_u64(seed),
        )
    }

    #[tokio::test]
    async fn test_pick_random_meme_respects_exclusion() {
        let catalog = test_catalog(vec![meme(1), meme(2), meme(3)], vec![], 7);

        for _ in 0..20 {
            let picked = catalog.pick_random_meme(&[1, 3]).await.unwrap();
            assert_eq!(picked.id, 2);
        }
    }

    #[tokio::test]
    async fn test_pick_random_meme_exhausted_catalog() {
        let catalog = test_catalog(vec![meme(1), meme(2)], vec![], 7);

        let result = catalog.pick_random_meme(&[1, 2]).await;
        assert_eq!(result, Err(GameError::NoContentAvailable));
    }

    #[tokio::test]
    async fn test_pick_random_meme_empty_catalog() {
        let catalog = test_catalog(vec![], vec![], 7);

        let result = catalog.pick_random_meme(&[]).await;
        assert_eq!(result, Err(GameError::NoContentAvailable));
    }

    #[tokio::test]
    async fn test_candidate_captions_full_catalog() {
        // Meme 1 has three correct captions; the catalog has plenty of
        // distractors, so the candidate set must be exactly 2 + 5.
        let captions = vec![
            caption(1, &[1]),
            caption(2, &[1]),
            caption(3, &[1, 2]),
            caption(4, &[2]),
            caption(5, &[]),
            caption(6, &[]),
            caption(7, &[]),
            caption(8, &[2]),
            caption(9, &[]),
            caption(10, &[]),
        ];
        let catalog = test_catalog(vec![meme(1), meme(2)], captions, 42);

        let candidates = catalog.candidate_captions(1).await.unwrap();
        assert_eq!(candidates.len(), MAX_CORRECT_CAPTIONS + DISTRACTOR_COUNT);

        let ids: HashSet<CaptionId> = candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), candidates.len(), "candidates must be distinct");

        let correct_count = candidates.iter().filter(|c| c.matches(1)).count();
        assert_eq!(correct_count, MAX_CORRECT_CAPTIONS);
    }

    #[tokio::test]
    async fn test_candidate_captions_degrades_below_minimum() {
        // One correct caption, two possible distractors.
        let captions = vec![caption(1, &[1]), caption(2, &[]), caption(3, &[2])];
        let catalog = test_catalog(vec![meme(1), meme(2)], captions, 42);

        let candidates = catalog.candidate_captions(1).await.unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates.iter().filter(|c| c.matches(1)).count(), 1);
    }

    #[tokio::test]
    async fn test_candidate_captions_seeded_rng_is_deterministic() {
        let captions: Vec<Caption> = (1..=12)
            .map(|id| caption(id, if id <= 3 { &[1][..] } else { &[][..] }))
            .collect();

        let first = test_catalog(vec![meme(1)], captions.clone(), 99)
            .candidate_captions(1)
            .await
            .unwrap();
        let second = test_catalog(vec![meme(1)], captions, 99)
            .candidate_captions(1)
            .await
            .unwrap();

        assert_eq!(first, second);
    }
}
