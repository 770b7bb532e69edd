//! Record store setup and initialization

use anyhow::{Context, Result};
use clipshare_core::{Config, RecordStoreBackend};
use clipshare_db::{run_migrations, MemoryUploadStore, PostgresUploadStore, UploadStore};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured record store. Postgres runs pending migrations first.
pub async fn setup_record_store(config: &Config) -> Result<Arc<dyn UploadStore>> {
    match config.record_store() {
        RecordStoreBackend::Postgres => {
            let pool = setup_database(config).await?;
            Ok(Arc::new(PostgresUploadStore::new(pool)))
        }
        RecordStoreBackend::Memory => {
            tracing::warn!("Using in-memory record store - uploads are forgotten on restart");
            Ok(Arc::new(MemoryUploadStore::new()))
        }
    }
}

/// Setup database connection pool and run migrations
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url()
        .context("DATABASE_URL must be set for the postgres record store")?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
