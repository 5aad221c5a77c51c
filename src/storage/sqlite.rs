use crate::models::UrlMapping;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        Self::with_acquire_timeout(database_url, max_connections, Duration::from_secs(30)).await
    }

    pub async fn with_acquire_timeout(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS short_urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_code VARCHAR(10) NOT NULL UNIQUE,
                original_url TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                expires_at DATETIME NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_short_urls_original_url ON short_urls(original_url)",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn insert(
        &self,
        short_code: &str,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> StorageResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO short_urls (short_code, original_url, created_at, expires_at, is_active)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(short_code) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(short_code)
        .bind(original_url)
        .bind(Utc::now())
        .bind(expires_at)
        .bind(is_active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        id.ok_or(StorageError::Conflict)
    }

    async fn fetch_by_code(&self, short_code: &str) -> StorageResult<Option<UrlMapping>> {
        let mapping = sqlx::query_as::<_, UrlMapping>(
            r#"
            SELECT id, short_code, original_url, created_at, expires_at, is_active
            FROM short_urls
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(mapping)
    }

    async fn fetch_code_by_url(&self, original_url: &str) -> StorageResult<Option<String>> {
        let code = sqlx::query_scalar::<_, String>(
            r#"
            SELECT short_code
            FROM short_urls
            WHERE original_url = ?
            ORDER BY is_active DESC, id
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(code)
    }

    async fn extend_expiration(
        &self,
        short_code: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET expires_at = ?
            WHERE short_code = ?
            "#,
        )
        .bind(expires_at)
        .bind(short_code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate(&self, short_code: &str) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET is_active = 0
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, short_code: &str) -> StorageResult<bool> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM short_urls WHERE short_code = ?)",
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists != 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
