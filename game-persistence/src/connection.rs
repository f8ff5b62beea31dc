use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, DbErr};
use tracing::info;

pub async fn connect_to_database() -> Result<DatabaseConnection, DbErr> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://meme_trivia.db?mode=rwc".to_string());

    Database::connect(&database_url).await
}

pub async fn connect_to_memory_database() -> Result<DatabaseConnection, DbErr> {
    Database::connect("sqlite::memory:").await
}

/// Connect, apply pending migrations, and seed the content catalog when the
/// database is fresh.
pub async fn connect_and_migrate() -> anyhow::Result<DatabaseConnection> {
    let db = connect_to_database().await?;
    Migrator::up(&db, None).await?;
    crate::seed::seed_default_content(&db).await?;
    info!("database ready");
    Ok(db)
}
