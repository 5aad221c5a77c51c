use crate::models::UrlMapping;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// In-process storage backed by a sharded map keyed by short code.
///
/// Uniqueness of short codes is enforced through the map's entry API, so two
/// concurrent inserts of the same code cannot both succeed.
#[derive(Debug)]
pub struct MemoryStorage {
    rows: DashMap<String, UrlMapping>,
    next_id: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn insert(
        &self,
        short_code: &str,
        original_url: &str,
        expires_at: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> StorageResult<i64> {
        match self.rows.entry(short_code.to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(UrlMapping {
                    id,
                    short_code: short_code.to_owned(),
                    original_url: original_url.to_owned(),
                    created_at: Utc::now(),
                    expires_at,
                    is_active,
                });
                Ok(id)
            }
        }
    }

    async fn fetch_by_code(&self, short_code: &str) -> StorageResult<Option<UrlMapping>> {
        Ok(self.rows.get(short_code).map(|row| row.value().clone()))
    }

    async fn fetch_code_by_url(&self, original_url: &str) -> StorageResult<Option<String>> {
        let code = self
            .rows
            .iter()
            .filter(|row| row.original_url == original_url)
            .min_by_key(|row| (!row.is_active, row.id))
            .map(|row| row.short_code.clone());
        Ok(code)
    }

    async fn extend_expiration(
        &self,
        short_code: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<bool> {
        match self.rows.get_mut(short_code) {
            Some(mut row) => {
                row.expires_at = Some(expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate(&self, short_code: &str) -> StorageResult<bool> {
        match self.rows.get_mut(short_code) {
            Some(mut row) => {
                row.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists(&self, short_code: &str) -> StorageResult<bool> {
        Ok(self.rows.contains_key(short_code))
    }

    async fn close(&self) {}
}
