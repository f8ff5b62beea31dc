use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use sea_orm::ActiveValue::Set;
use sea_orm::{DatabaseConnection, EntityTrait};
use sha2::{Digest, Sha256};
use tracing::info;

use game_types::User;

use crate::entities::{prelude::*, users};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn hash_password(password: &str, salt: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        BASE64.encode(hasher.finalize())
    }

    /// Register a username with a salted password hash. Returns `None` when
    /// the username is already taken.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<Option<User>> {
        if Users::find_by_id(username).one(&self.db).await?.is_some() {
            return Ok(None);
        }

        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);

        let model = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(Self::hash_password(password, &salt)),
            salt: Set(BASE64.encode(salt)),
            created_at: Set(chrono::Utc::now().into()),
        };
        Users::insert(model).exec(&self.db).await?;

        info!(username, "user registered");
        Ok(Some(User::new(username)))
    }

    /// Returns the user when the password matches, `None` for an unknown
    /// username or a wrong password. The two cases are indistinguishable to
    /// callers on purpose.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(model) = Users::find_by_id(username).one(&self.db).await? else {
            return Ok(None);
        };

        let salt = BASE64.decode(&model.salt)?;
        if Self::hash_password(password, &salt) == model.password_hash {
            Ok(Some(User::new(username)))
        } else {
            Ok(None)
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let model = Users::find_by_id(username).one(&self.db).await?;
        Ok(model.map(|m| User::new(m.username)))
    }

    /// Delete the account. Games and rounds cascade with it.
    pub async fn delete_user(&self, username: &str) -> Result<bool> {
        let result = Users::delete_by_id(username).exec(&self.db).await?;
        if result.rows_affected == 1 {
            info!(username, "user deleted");
        }
        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use crate::repositories::GameRepository;
    use game_core::store::GameStore;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> (DatabaseConnection, UserRepository) {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (db.clone(), UserRepository::new(db))
    }

    #[tokio::test]
    async fn test_create_and_verify_user() {
        let (_db, repo) = setup_test_db().await;

        let user = repo.create_user("alice", "hunter2").await.unwrap().unwrap();
        assert_eq!(user.username, "alice");

        let ok = repo.verify_credentials("alice", "hunter2").await.unwrap();
        assert_eq!(ok, Some(User::new("alice")));

        let wrong = repo.verify_credentials("alice", "letmein").await.unwrap();
        assert_eq!(wrong, None);

        let unknown = repo.verify_credentials("mallory", "hunter2").await.unwrap();
        assert_eq!(unknown, None);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (_db, repo) = setup_test_db().await;

        assert!(repo.create_user("alice", "one").await.unwrap().is_some());
        assert!(repo.create_user("alice", "two").await.unwrap().is_none());

        // The original password still works.
        let ok = repo.verify_credentials("alice", "one").await.unwrap();
        assert!(ok.is_some());
    }

    #[tokio::test]
    async fn test_same_password_hashes_differently_per_user() {
        let (db, repo) = setup_test_db().await;

        repo.create_user("alice", "hunter2").await.unwrap();
        repo.create_user("bob", "hunter2").await.unwrap();

        let alice = Users::find_by_id("alice").one(&db).await.unwrap().unwrap();
        let bob = Users::find_by_id("bob").one(&db).await.unwrap().unwrap();
        assert_ne!(alice.password_hash, bob.password_hash);
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_games() {
        let (db, repo) = setup_test_db().await;
        repo.create_user("alice", "hunter2").await.unwrap();

        let games = GameRepository::new(db);
        let game = games.try_insert_active_game("alice").await.unwrap().unwrap();

        assert!(repo.delete_user("alice").await.unwrap());
        assert!(!repo.delete_user("alice").await.unwrap());

        assert!(games.game_by_id(game.id).await.unwrap().is_none());
        assert_eq!(repo.find_by_username("alice").await.unwrap(), None);
    }
}
