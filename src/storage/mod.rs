pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{Storage, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// Open the configured backend and make sure its schema exists.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn Storage>> {
    let acquire_timeout = Duration::from_secs(config.acquire_timeout_secs);
    let storage: Arc<dyn Storage> = match config.backend {
        DatabaseBackend::Sqlite => {
            tracing::info!("Using SQLite storage: {}", config.url);
            Arc::new(
                SqliteStorage::with_acquire_timeout(
                    &config.url,
                    config.max_connections,
                    acquire_timeout,
                )
                .await
                .with_context(|| format!("failed to open SQLite database {}", config.url))?,
            )
        }
        DatabaseBackend::Postgres => {
            tracing::info!("Using PostgreSQL storage");
            Arc::new(
                PostgresStorage::with_acquire_timeout(
                    &config.url,
                    config.max_connections,
                    acquire_timeout,
                )
                .await
                .context("failed to connect to PostgreSQL")?,
            )
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory storage, mappings are lost on shutdown");
            Arc::new(MemoryStorage::new())
        }
    };

    storage
        .init()
        .await
        .context("failed to initialize database schema")?;
    Ok(storage)
}
