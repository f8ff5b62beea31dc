use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use game_core::store::RoundStore;
use game_types::{CaptionId, GameError, GameId, GameResult, MemeId, Round, RoundId, RoundState};

use crate::entities::{prelude::*, rounds};

const STATE_PENDING: &str = "pending";
const STATE_ACTIVE: &str = "active";
const STATE_RESOLVED: &str = "resolved";

fn state_to_str(state: RoundState) -> &'static str {
    match state {
        RoundState::Pending => STATE_PENDING,
        RoundState::Active => STATE_ACTIVE,
        RoundState::Resolved => STATE_RESOLVED,
    }
}

#[derive(Clone)]
pub struct RoundRepository {
    db: DatabaseConnection,
}

impl RoundRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_round(model: rounds::Model) -> GameResult<Round> {
        let caption_ids: Vec<CaptionId> =
            serde_json::from_str(&model.caption_ids).map_err(GameError::storage)?;
        let state = match model.state.as_str() {
            STATE_PENDING => RoundState::Pending,
            STATE_ACTIVE => RoundState::Active,
            STATE_RESOLVED => RoundState::Resolved,
            other => {
                return Err(GameError::storage(format!("unknown round state {other:?}")));
            }
        };
        Ok(Round {
            id: model.id,
            game_id: model.game_id,
            meme_id: model.meme_id,
            caption_ids,
            state,
            score: model.score,
            chosen_caption_id: model.chosen_caption_id,
        })
    }
}

#[async_trait]
impl RoundStore for RoundRepository {
    async fn insert_round(
        &self,
        game_id: GameId,
        meme_id: MemeId,
        caption_ids: Vec<CaptionId>,
    ) -> GameResult<Round> {
        let model = rounds::ActiveModel {
            game_id: Set(game_id),
            meme_id: Set(meme_id),
            caption_ids: Set(serde_json::to_string(&caption_ids).map_err(GameError::storage)?),
            state: Set(STATE_PENDING.to_string()),
            score: Set(0),
            chosen_caption_id: Set(None),
            ..Default::default()
        };
        let inserted = Rounds::insert(model)
            .exec(&self.db)
            .await
            .map_err(GameError::storage)?;

        let created = Rounds::find_by_id(inserted.last_insert_id)
            .one(&self.db)
            .await
            .map_err(GameError::storage)?
            .ok_or_else(|| GameError::storage("inserted round not found"))?;
        Self::model_to_round(created)
    }

    async fn round_by_id(&self, round_id: RoundId) -> GameResult<Option<Round>> {
        let model = Rounds::find_by_id(round_id)
            .one(&self.db)
            .await
            .map_err(GameError::storage)?;
        model.map(Self::model_to_round).transpose()
    }

    async fn set_round_state(&self, round_id: RoundId, state: RoundState) -> GameResult<()> {
        Rounds::update_many()
            .col_expr(rounds::Column::State, Expr::value(state_to_str(state)))
            .filter(rounds::Column::Id.eq(round_id))
            .exec(&self.db)
            .await
            .map_err(GameError::storage)?;
        Ok(())
    }

    async fn record_resolution(
        &self,
        round_id: RoundId,
        chosen: Option<CaptionId>,
        score: i32,
    ) -> GameResult<()> {
        Rounds::update_many()
            .col_expr(rounds::Column::State, Expr::value(STATE_RESOLVED))
            .col_expr(rounds::Column::Score, Expr::value(score))
            .col_expr(rounds::Column::ChosenCaptionId, Expr::value(chosen))
            .filter(rounds::Column::Id.eq(round_id))
            .exec(&self.db)
            .await
            .map_err(GameError::storage)?;
        Ok(())
    }
}
