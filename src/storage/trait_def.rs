use crate::models::UrlMapping;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists")]
    Conflict,
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Unavailable(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence contract for short URL mappings.
///
/// Implementations report transport failures as [`StorageError::Unavailable`]
/// and never retry internally. Lookups that miss return `Ok(None)` or `Ok(false)`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Insert a new mapping and return its row id.
    ///
    /// Fails with [`StorageError::Conflict`] when `short_code` is already taken.
    async fn insert(
        &self,
        short_code: &str,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> StorageResult<i64>;

    /// Get a mapping by short code, regardless of its active or expiry state
    async fn fetch_by_code(&self, short_code: &str) -> StorageResult<Option<UrlMapping>>;

    /// Get the short code of the oldest mapping for `original_url`, preferring active ones
    async fn fetch_code_by_url(&self, original_url: &str) -> StorageResult<Option<String>>;

    /// Replace the expiration of a mapping. Returns whether a row was affected.
    async fn extend_expiration(
        &self,
        short_code: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<bool>;

    /// Deactivate a mapping (soft delete). Returns whether a row was affected.
    async fn deactivate(&self, short_code: &str) -> StorageResult<bool>;

    async fn exists(&self, short_code: &str) -> StorageResult<bool>;

    /// Release pooled connections
    async fn close(&self);
}
