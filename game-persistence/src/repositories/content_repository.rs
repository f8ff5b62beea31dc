use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use game_core::store::ContentStore;
use game_types::{Caption, CaptionId, GameError, GameResult, Meme, MemeId};

use crate::entities::{captions, memes, prelude::*};

#[derive(Clone)]
pub struct ContentRepository {
    db: DatabaseConnection,
}

impl ContentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_meme(model: memes::Model) -> Meme {
        Meme {
            id: model.id,
            image_ref: model.image_ref,
        }
    }

    fn model_to_caption(model: captions::Model) -> GameResult<Caption> {
        let correct_meme_ids =
            serde_json::from_str(&model.meme_ids).map_err(GameError::storage)?;
        Ok(Caption {
            id: model.id,
            text: model.text,
            correct_meme_ids,
        })
    }
}

#[async_trait]
impl ContentStore for ContentRepository {
    async fn list_memes(&self) -> GameResult<Vec<Meme>> {
        let models = Memes::find()
            .all(&self.db)
            .await
            .map_err(GameError::storage)?;
        Ok(models.into_iter().map(Self::model_to_meme).collect())
    }

    async fn meme_by_id(&self, meme_id: MemeId) -> GameResult<Option<Meme>> {
        let model = Memes::find_by_id(meme_id)
            .one(&self.db)
            .await
            .map_err(GameError::storage)?;
        Ok(model.map(Self::model_to_meme))
    }

    async fn captions_for_meme(&self, meme_id: MemeId) -> GameResult<Vec<Caption>> {
        // Correctness lives in a JSON membership column, so the catalog is
        // filtered in process. It is small and read-heavy.
        let all = self.list_captions().await?;
        Ok(all
            .into_iter()
            .filter(|caption| caption.matches(meme_id))
            .collect())
    }

    async fn list_captions(&self) -> GameResult<Vec<Caption>> {
        let models = Captions::find()
            .all(&self.db)
            .await
            .map_err(GameError::storage)?;
        models.into_iter().map(Self::model_to_caption).collect()
    }

    async fn caption_by_id(&self, caption_id: CaptionId) -> GameResult<Option<Caption>> {
        let model = Captions::find_by_id(caption_id)
            .one(&self.db)
            .await
            .map_err(GameError::storage)?;
        model.map(Self::model_to_caption).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use crate::seed::seed_default_content;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_repo() -> ContentRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        seed_default_content(&db).await.unwrap();
        ContentRepository::new(db)
    }

    #[tokio::test]
    async fn test_list_and_find_memes() {
        let repo = setup_test_repo().await;

        let memes = repo.list_memes().await.unwrap();
        assert!(!memes.is_empty());

        let first = &memes[0];
        let found = repo.meme_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(found.image_ref, first.image_ref);

        assert_eq!(repo.meme_by_id(9999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_captions_for_meme_filters_by_correctness() {
        let repo = setup_test_repo().await;

        let memes = repo.list_memes().await.unwrap();
        let meme_id = memes[0].id;

        let correct = repo.captions_for_meme(meme_id).await.unwrap();
        assert_eq!(correct.len(), 2);
        assert!(correct.iter().all(|c| c.matches(meme_id)));

        let all = repo.list_captions().await.unwrap();
        assert!(all.len() > correct.len());
    }

    #[tokio::test]
    async fn test_caption_round_trips_meme_ids() {
        let repo = setup_test_repo().await;

        let all = repo.list_captions().await.unwrap();
        let caption = repo.caption_by_id(all[0].id).await.unwrap().unwrap();
        assert_eq!(caption, all[0]);
        assert_eq!(caption.correct_meme_ids.len(), 1);

        assert_eq!(repo.caption_by_id(9999).await.unwrap(), None);
    }
}
