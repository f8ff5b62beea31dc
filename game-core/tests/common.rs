use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;

use game_core::store::{ContentStore, GameStore, RoundStore};
use game_core::{ContentCatalog, GameSessionManager, RoundManager};
use game_types::{
    Caption, CaptionId, Game, GameId, GameResult, GameStatus, Meme, MemeId, Round, RoundId,
    RoundState, User,
};

/// In-memory store implementing all three storage traits, for driving the
/// session engine without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    memes: Vec<Meme>,
    captions: Vec<Caption>,
    games: HashMap<GameId, Game>,
    rounds: HashMap<RoundId, Round>,
    next_game_id: GameId,
    next_round_id: RoundId,
}

impl MemoryStore {
    pub fn with_content(memes: Vec<Meme>, captions: Vec<Caption>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                memes,
                captions,
                ..Inner::default()
            }),
        })
    }

    pub fn round(&self, round_id: RoundId) -> Round {
        self.inner.lock().unwrap().rounds[&round_id].clone()
    }

    pub fn game(&self, game_id: GameId) -> Game {
        self.inner.lock().unwrap().games[&game_id].clone()
    }

    pub fn game_count(&self) -> usize {
        self.inner.lock().unwrap().games.len()
    }

    pub fn round_count(&self) -> usize {
        self.inner.lock().unwrap().rounds.len()
    }

    pub fn caption(&self, caption_id: CaptionId) -> Caption {
        self.inner
            .lock()
            .unwrap()
            .captions
            .iter()
            .find(|c| c.id == caption_id)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_memes(&self) -> GameResult<Vec<Meme>> {
        Ok(self.inner.lock().unwrap().memes.clone())
    }

    async fn meme_by_id(&self, meme_id: MemeId) -> GameResult<Option<Meme>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .memes
            .iter()
            .find(|m| m.id == meme_id)
            .cloned())
    }

    async fn captions_for_meme(&self, meme_id: MemeId) -> GameResult<Vec<Caption>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .captions
            .iter()
            .filter(|c| c.matches(meme_id))
            .cloned()
            .collect())
    }

    async fn list_captions(&self) -> GameResult<Vec<Caption>> {
        Ok(self.inner.lock().unwrap().captions.clone())
    }

    async fn caption_by_id(&self, caption_id: CaptionId) -> GameResult<Option<Caption>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .captions
            .iter()
            .find(|c| c.id == caption_id)
            .cloned())
    }
}

#[async_trait]
impl RoundStore for MemoryStore {
    async fn insert_round(
        &self,
        game_id: GameId,
        meme_id: MemeId,
        caption_ids: Vec<CaptionId>,
    ) -> GameResult<Round> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_round_id += 1;
        let round = Round {
            id: inner.next_round_id,
            game_id,
            meme_id,
            caption_ids,
            state: RoundState::Pending,
            score: 0,
            chosen_caption_id: None,
        };
        inner.rounds.insert(round.id, round.clone());
        Ok(round)
    }

    async fn round_by_id(&self, round_id: RoundId) -> GameResult<Option<Round>> {
        Ok(self.inner.lock().unwrap().rounds.get(&round_id).cloned())
    }

    async fn set_round_state(&self, round_id: RoundId, state: RoundState) -> GameResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(round) = inner.rounds.get_mut(&round_id) {
            round.state = state;
        }
        Ok(())
    }

    async fn record_resolution(
        &self,
        round_id: RoundId,
        chosen: Option<CaptionId>,
        score: i32,
    ) -> GameResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(round) = inner.rounds.get_mut(&round_id) {
            round.state = RoundState::Resolved;
            round.chosen_caption_id = chosen;
            round.score = score;
        }
        Ok(())
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn try_insert_active_game(&self, username: &str) -> GameResult<Option<Game>> {
        let mut inner = self.inner.lock().unwrap();
        let has_active = inner
            .games
            .values()
            .any(|g| g.username == username && g.is_active());
        if has_active {
            return Ok(None);
        }
        inner.next_game_id += 1;
        let game = Game {
            id: inner.next_game_id,
            username: username.to_string(),
            score: 0,
            status: GameStatus::Active,
            round_ids: Vec::new(),
            created_at: format!("2025-06-01T00:00:{:02}Z", inner.next_game_id % 60),
        };
        inner.games.insert(game.id, game.clone());
        Ok(Some(game))
    }

    async fn attach_rounds(&self, game_id: GameId, round_ids: &[RoundId]) -> GameResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(game) = inner.games.get_mut(&game_id) {
            game.round_ids = round_ids.to_vec();
        }
        Ok(())
    }

    async fn game_by_id(&self, game_id: GameId) -> GameResult<Option<Game>> {
        Ok(self.inner.lock().unwrap().games.get(&game_id).cloned())
    }

    async fn add_score(&self, game_id: GameId, points: i32) -> GameResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(game) = inner.games.get_mut(&game_id) {
            game.score += points;
        }
        Ok(())
    }

    async fn finish_game(&self, game_id: GameId) -> GameResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.games.get_mut(&game_id) {
            Some(game) if game.is_active() => {
                game.status = GameStatus::Finished;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_game(&self, game_id: GameId) -> GameResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.games.remove(&game_id);
        // Matches the cascade a relational store performs.
        inner.rounds.retain(|_, round| round.game_id != game_id);
        Ok(())
    }

    async fn active_game_by_username(&self, username: &str) -> GameResult<Option<Game>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .games
            .values()
            .find(|g| g.username == username && g.is_active())
            .cloned())
    }

    async fn games_by_username(&self, username: &str) -> GameResult<Vec<Game>> {
        let mut games: Vec<Game> = self
            .inner
            .lock()
            .unwrap()
            .games
            .values()
            .filter(|g| g.username == username)
            .cloned()
            .collect();
        // Ids grow with time, so id order stands in for created_at order.
        games.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(games)
    }
}

/// Catalog of 4 memes, 2 correct captions each, plus 8 pure distractors.
/// Every meme sees at least 5 distractors, so candidate sets are full.
pub fn seeded_content() -> (Vec<Meme>, Vec<Caption>) {
    let memes: Vec<Meme> = (1..=4)
        .map(|id| Meme {
            id,
            image_ref: format!("memes/{id:02}.webp"),
        })
        .collect();

    let mut captions = Vec::new();
    for meme_id in 1..=4i64 {
        for n in 0..2i64 {
            captions.push(Caption {
                id: meme_id * 2 - 1 + n,
                text: format!("correct caption {n} for meme {meme_id}"),
                correct_meme_ids: vec![meme_id],
            });
        }
    }
    for id in 9..=16i64 {
        captions.push(Caption {
            id,
            text: format!("distractor caption {id}"),
            correct_meme_ids: Vec::new(),
        });
    }
    (memes, captions)
}

/// Session manager over an in-memory store with a seeded RNG.
pub fn create_test_manager(seed: u64) -> (Arc<MemoryStore>, GameSessionManager) {
    let (memes, captions) = seeded_content();
    create_manager_with_content(seed, memes, captions)
}

/// Same, over arbitrary content, for exercising thin catalogs.
pub fn create_manager_with_content(
    seed: u64,
    memes: Vec<Meme>,
    captions: Vec<Caption>,
) -> (Arc<MemoryStore>, GameSessionManager) {
    let store = MemoryStore::with_content(memes, captions);
    let catalog = ContentCatalog::with_rng(store.clone(), StdRng::seed_from_u64(seed));
    let rounds = RoundManager::new(store.clone());
    let manager = GameSessionManager::new(catalog, store.clone(), rounds);
    (store, manager)
}

pub fn test_user(name: &str) -> User {
    User::new(name)
}

/// A caption id from the round's candidates that is correct for its meme.
pub fn correct_caption_for(store: &MemoryStore, round: &Round) -> CaptionId {
    round
        .caption_ids
        .iter()
        .copied()
        .find(|id| store.caption(*id).matches(round.meme_id))
        .expect("round should offer a correct caption")
}

/// A caption id from the round's candidates that is wrong for its meme.
pub fn wrong_caption_for(store: &MemoryStore, round: &Round) -> CaptionId {
    round
        .caption_ids
        .iter()
        .copied()
        .find(|id| !store.caption(*id).matches(round.meme_id))
        .expect("round should offer a distractor caption")
}
