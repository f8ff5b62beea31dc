use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::warn;

use game_core::store::GameStore;
use game_types::{Game, GameError, GameId, GameResult, GameStatus, RoundId};

use crate::entities::{games, prelude::*};

pub(crate) const STATUS_ACTIVE: &str = "active";
pub(crate) const STATUS_FINISHED: &str = "finished";

#[derive(Clone)]
pub struct GameRepository {
    db: DatabaseConnection,
}

impl GameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_game(model: games::Model) -> GameResult<Game> {
        let round_ids: Vec<RoundId> =
            serde_json::from_str(&model.round_ids).map_err(GameError::storage)?;
        let status = match model.status.as_str() {
            STATUS_ACTIVE => GameStatus::Active,
            STATUS_FINISHED => GameStatus::Finished,
            other => {
                return Err(GameError::storage(format!("unknown game status {other:?}")));
            }
        };
        Ok(Game {
            id: model.id,
            username: model.username,
            score: model.score,
            status,
            round_ids,
            created_at: model.created_at.to_rfc3339(),
        })
    }

    fn is_unique_violation(err: &DbErr) -> bool {
        err.to_string().contains("UNIQUE constraint failed")
    }
}

#[async_trait]
impl GameStore for GameRepository {
    async fn try_insert_active_game(&self, username: &str) -> GameResult<Option<Game>> {
        let txn = self.db.begin().await.map_err(GameError::storage)?;

        let existing = Games::find()
            .filter(games::Column::Username.eq(username))
            .filter(games::Column::Status.eq(STATUS_ACTIVE))
            .one(&txn)
            .await
            .map_err(GameError::storage)?;
        if existing.is_some() {
            txn.rollback().await.map_err(GameError::storage)?;
            return Ok(None);
        }

        let model = games::ActiveModel {
            username: Set(username.to_string()),
            score: Set(0),
            status: Set(STATUS_ACTIVE.to_string()),
            round_ids: Set("[]".to_string()),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        let inserted = match Games::insert(model).exec(&txn).await {
            Ok(result) => result,
            // A racing create slipped past the read; the partial unique
            // index on active games rejects the loser.
            Err(err) if Self::is_unique_violation(&err) => {
                warn!(username, "lost game creation race");
                txn.rollback().await.map_err(GameError::storage)?;
                return Ok(None);
            }
            Err(err) => return Err(GameError::storage(err)),
        };

        let created = Games::find_by_id(inserted.last_insert_id)
            .one(&txn)
            .await
            .map_err(GameError::storage)?
            .ok_or_else(|| GameError::storage("inserted game not found"))?;
        txn.commit().await.map_err(GameError::storage)?;

        Self::model_to_game(created).map(Some)
    }

    async fn attach_rounds(&self, game_id: GameId, round_ids: &[RoundId]) -> GameResult<()> {
        let round_ids_json = serde_json::to_string(round_ids).map_err(GameError::storage)?;
        Games::update_many()
            .col_expr(games::Column::RoundIds, Expr::value(round_ids_json))
            .filter(games::Column::Id.eq(game_id))
            .exec(&self.db)
            .await
            .map_err(GameError::storage)?;
        Ok(())
    }

    async fn game_by_id(&self, game_id: GameId) -> GameResult<Option<Game>> {
        let model = Games::find_by_id(game_id)
            .one(&self.db)
            .await
            .map_err(GameError::storage)?;
        model.map(Self::model_to_game).transpose()
    }

    async fn add_score(&self, game_id: GameId, points: i32) -> GameResult<()> {
        Games::update_many()
            .col_expr(
                games::Column::Score,
                Expr::col(games::Column::Score).add(points),
            )
            .filter(games::Column::Id.eq(game_id))
            .exec(&self.db)
            .await
            .map_err(GameError::storage)?;
        Ok(())
    }

    async fn finish_game(&self, game_id: GameId) -> GameResult<bool> {
        let result = Games::update_many()
            .col_expr(games::Column::Status, Expr::value(STATUS_FINISHED))
            .filter(games::Column::Id.eq(game_id))
            .filter(games::Column::Status.eq(STATUS_ACTIVE))
            .exec(&self.db)
            .await
            .map_err(GameError::storage)?;
        Ok(result.rows_affected == 1)
    }

    async fn delete_game(&self, game_id: GameId) -> GameResult<()> {
        Games::delete_by_id(game_id)
            .exec(&self.db)
            .await
            .map_err(GameError::storage)?;
        Ok(())
    }

    async fn active_game_by_username(&self, username: &str) -> GameResult<Option<Game>> {
        let model = Games::find()
            .filter(games::Column::Username.eq(username))
            .filter(games::Column::Status.eq(STATUS_ACTIVE))
            .one(&self.db)
            .await
            .map_err(GameError::storage)?;
        model.map(Self::model_to_game).transpose()
    }

    async fn games_by_username(&self, username: &str) -> GameResult<Vec<Game>> {
        let models = Games::find()
            .filter(games::Column::Username.eq(username))
            .order_by_desc(games::Column::CreatedAt)
            .order_by_desc(games::Column::Id)
            .all(&self.db)
            .await
            .map_err(GameError::storage)?;
        models.into_iter().map(Self::model_to_game).collect()
    }
}
