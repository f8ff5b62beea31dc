use std::sync::Arc;

use tracing::{debug, info};

use game_types::{
    Caption, CaptionId, Game, GameError, GameId, GameResult, GameStatus, GuestGame, GuestRound,
    Meme, MemeId, Round, RoundId, RoundOutcome, RoundState, User,
};

use crate::catalog::ContentCatalog;
use crate::round::RoundManager;
use crate::store::GameStore;

/// Rounds in a registered game. Guest play is always a single round.
pub const ROUNDS_PER_GAME: usize = 3;

/// Orchestrates games for registered users and guests. All game mutation
/// funnels through these operations; the round manager and catalog never
/// touch game state directly.
pub struct GameSessionManager {
    catalog: ContentCatalog,
    games: Arc<dyn GameStore>,
    rounds: RoundManager,
}

impl GameSessionManager {
    pub fn new(catalog: ContentCatalog, games: Arc<dyn GameStore>, rounds: RoundManager) -> Self {
        Self {
            catalog,
            games,
            rounds,
        }
    }

    /// Create a new game of `ROUNDS_PER_GAME` rounds over distinct memes and
    /// activate the first round. Fails with `ActiveGameAlreadyExists` when
    /// the user already owns an Active game; the store makes that check
    /// atomic with the insert.
    pub async fn create_game(&self, user: &User) -> GameResult<Game> {
        let Some(mut game) = self.games.try_insert_active_game(&user.username).await? else {
            return Err(GameError::ActiveGameAlreadyExists);
        };

        // Round setup can still fail here (exhausted catalog, storage
        // trouble). The empty game row must not outlive such a failure or
        // it would hold the user's active-game slot without being playable.
        match self.deal_rounds(game.id).await {
            Ok(round_ids) => {
                game.round_ids = round_ids;
                info!(game_id = game.id, username = %user.username, "game created");
                Ok(game)
            }
            Err(err) => {
                self.games.delete_game(game.id).await?;
                Err(err)
            }
        }
    }

    /// Pick the memes, persist the rounds, activate the first, and attach
    /// the sequence to the game.
    async fn deal_rounds(&self, game_id: GameId) -> GameResult<Vec<RoundId>> {
        // Exclusion set grows as memes are chosen so no meme repeats within
        // the game.
        let mut meme_ids: Vec<MemeId> = Vec::with_capacity(ROUNDS_PER_GAME);
        let mut round_ids: Vec<RoundId> = Vec::with_capacity(ROUNDS_PER_GAME);
        for _ in 0..ROUNDS_PER_GAME {
            let meme = self.catalog.pick_random_meme(&meme_ids).await?;
            meme_ids.push(meme.id);
            let round = self
                .rounds
                .create_round(&self.catalog, game_id, meme.id)
                .await?;
            round_ids.push(round.id);
        }

        self.rounds.activate(round_ids[0]).await?;
        self.games.attach_rounds(game_id, &round_ids).await?;
        Ok(round_ids)
    }

    /// Single ephemeral round for an unauthenticated visitor. Nothing is
    /// persisted and the one-active-game constraint does not apply.
    pub async fn create_guest_game(&self) -> GameResult<GuestGame> {
        let meme = self.catalog.pick_random_meme(&[]).await?;
        let captions = self.catalog.candidate_captions(meme.id).await?;
        debug!(meme_id = meme.id, "guest game created");
        Ok(GuestGame {
            score: 0,
            status: GameStatus::Active,
            round: GuestRound {
                meme,
                captions,
                state: RoundState::Active,
            },
        })
    }

    /// Ownership-checked fetch, for game history detail views.
    pub async fn get_game(&self, user: &User, game_id: GameId) -> GameResult<Game> {
        match self.games.game_by_id(game_id).await? {
            Some(game) if game.username == user.username => Ok(game),
            _ => Err(GameError::GameNotFound),
        }
    }

    /// The first Active round in play order, or `None` when every round is
    /// already Resolved — the signal that the caller should finish the game.
    pub async fn get_current_round(&self, game_id: GameId) -> GameResult<Option<Round>> {
        let game = self.require_active_game(game_id).await?;
        for round_id in &game.round_ids {
            let round = self.rounds.round_by_id(*round_id).await?;
            if round.state == RoundState::Active {
                return Ok(Some(round));
            }
        }
        Ok(None)
    }

    /// Resolve the current round with `chosen` (`None` = timeout), add its
    /// score to the game, then activate the next Pending round in sequence.
    /// Advancement is a side effect of submission: the next round is
    /// playable the moment this returns, and callers poll
    /// `get_current_round` to learn whether the game continues.
    pub async fn submit_answer(
        &self,
        game_id: GameId,
        chosen: Option<CaptionId>,
    ) -> GameResult<RoundOutcome> {
        let game = self.require_active_game(game_id).await?;
        let current = self
            .get_current_round(game_id)
            .await?
            .ok_or(GameError::RoundNotFound)?;

        let outcome = self
            .rounds
            .resolve(self.catalog.store(), current.id, chosen)
            .await?;
        self.games.add_score(game_id, outcome.score).await?;

        if let Some(position) = game.round_ids.iter().position(|id| *id == current.id) {
            if let Some(next_id) = game.round_ids.get(position + 1) {
                self.rounds.activate(*next_id).await?;
            }
        }

        debug!(
            game_id,
            round_id = current.id,
            correct = outcome.correct,
            "answer submitted"
        );
        Ok(outcome)
    }

    /// Close an Active game owned by `user`. Finished games are not
    /// re-finishable: a second call fails with `GameNotFound`.
    pub async fn finish_game(&self, user: &User, game_id: GameId) -> GameResult<()> {
        let game = self.require_active_game(game_id).await?;
        if game.username != user.username {
            return Err(GameError::GameNotFound);
        }
        if !self.games.finish_game(game_id).await? {
            return Err(GameError::GameNotFound);
        }
        info!(game_id, score = game.score, "game finished");
        Ok(())
    }

    pub async fn get_active_game(&self, user: &User) -> GameResult<Game> {
        self.games
            .active_game_by_username(&user.username)
            .await?
            .ok_or(GameError::GameNotFound)
    }

    /// Game history, most recent first. An empty list is a valid result.
    pub async fn list_games(&self, user: &User) -> GameResult<Vec<Game>> {
        self.games.games_by_username(&user.username).await
    }

    /// Round lookup for the boundary's round detail endpoint.
    pub async fn get_round(&self, round_id: RoundId) -> GameResult<Round> {
        self.rounds.round_by_id(round_id).await
    }

    pub async fn meme_by_id(&self, meme_id: MemeId) -> GameResult<Option<Meme>> {
        self.catalog.store().meme_by_id(meme_id).await
    }

    pub async fn caption_by_id(&self, caption_id: CaptionId) -> GameResult<Caption> {
        self.catalog
            .store()
            .caption_by_id(caption_id)
            .await?
            .ok_or(GameError::CaptionNotFound)
    }

    async fn require_active_game(&self, game_id: GameId) -> GameResult<Game> {
        match self.games.game_by_id(game_id).await? {
            Some(game) if game.is_active() => Ok(game),
            _ => Err(GameError::GameNotFound),
        }
    }
}
