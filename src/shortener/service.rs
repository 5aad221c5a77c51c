use axum::http::HeaderValue;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::code::Candidates;
use super::error::{ShortenerError, ShortenerResult};
use crate::models::UrlMapping;
use crate::storage::{Storage, StorageError};

#[derive(Debug, Clone)]
pub struct ShortenerConfig {
    /// Upper bound on candidates probed for one URL, counting both `exists`
    /// hits and insert conflicts
    pub max_attempts: u32,
    /// Appended to the working URL after each collision
    pub filler: char,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 32,
            filler: 'x',
        }
    }
}

/// Mints short codes against a [`Storage`] and resolves them back.
///
/// Shortening a URL that already has a mapping extends that mapping's
/// expiration and returns its code instead of creating a new row.
pub struct Shortener {
    storage: Arc<dyn Storage>,
    config: ShortenerConfig,
}

impl Shortener {
    pub fn new(storage: Arc<dyn Storage>, config: ShortenerConfig) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }

    /// Return a short code for `url` that stays valid for `ttl_minutes` from now.
    pub async fn shorten(&self, url: &str, ttl_minutes: i64) -> ShortenerResult<String> {
        validate_url(url)?;
        let expires_at = expiry_from_now(ttl_minutes)?;

        if let Some(existing) = self.reusable_mapping(url).await? {
            let code = existing.short_code;
            if self.storage.extend_expiration(&code, expires_at).await? {
                info!(short_code = %code, %expires_at, "extended existing mapping");
                return Ok(code);
            }
            warn!(short_code = %code, "mapping disappeared before it could be extended");
        }

        self.mint(url, expires_at).await
    }

    /// The active mapping already stored for `url`, if any. Deactivated rows
    /// are superseded by a fresh mint rather than revived.
    async fn reusable_mapping(&self, url: &str) -> ShortenerResult<Option<UrlMapping>> {
        let Some(code) = self.storage.fetch_code_by_url(url).await? else {
            return Ok(None);
        };
        match self.storage.fetch_by_code(&code).await? {
            Some(mapping) if mapping.is_active => Ok(Some(mapping)),
            Some(_) => {
                debug!(short_code = %code, "existing mapping is deactivated, minting a new one");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn mint(&self, url: &str, expires_at: DateTime<Utc>) -> ShortenerResult<String> {
        let max_attempts = self.config.max_attempts;
        let candidates = Candidates::new(url, self.config.filler).take(max_attempts as usize);

        for (attempt, candidate) in candidates.enumerate() {
            if self.storage.exists(&candidate).await? {
                debug!(attempt, short_code = %candidate, "short code collision");
                continue;
            }

            match self
                .storage
                .insert(&candidate, url, Some(expires_at), true)
                .await
            {
                Ok(id) => {
                    info!(id, short_code = %candidate, %expires_at, "created mapping");
                    return Ok(candidate);
                }
                Err(StorageError::Conflict) => {
                    warn!(attempt, short_code = %candidate, "short code taken by a concurrent insert");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ShortenerError::CodeSpaceExhausted {
            attempts: max_attempts,
        })
    }

    /// Look up the mapping for `short_code`, whatever its lifecycle state.
    pub async fn resolve(&self, short_code: &str) -> ShortenerResult<UrlMapping> {
        self.storage
            .fetch_by_code(short_code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(short_code.to_string()))
    }

    /// Resolve a full short URL such as `http://host/f/abc12`, or a bare code.
    pub async fn resolve_short_url(&self, short_url: &str) -> ShortenerResult<UrlMapping> {
        let code = short_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        self.resolve(code).await
    }

    pub async fn extend(&self, short_code: &str, ttl_minutes: i64) -> ShortenerResult<bool> {
        let expires_at = expiry_from_now(ttl_minutes)?;
        let extended = self
            .storage
            .extend_expiration(short_code, expires_at)
            .await?;
        if extended {
            info!(short_code, %expires_at, "extended mapping");
        }
        Ok(extended)
    }

    pub async fn deactivate(&self, short_code: &str) -> ShortenerResult<bool> {
        let deactivated = self.storage.deactivate(short_code).await?;
        if deactivated {
            info!(short_code, "deactivated mapping");
        }
        Ok(deactivated)
    }
}

/// A URL must be non-blank and usable verbatim as a `Location` header.
fn validate_url(url: &str) -> ShortenerResult<()> {
    if url.trim().is_empty() {
        return Err(ShortenerError::InvalidArgument("URL is required".to_string()));
    }
    if HeaderValue::from_str(url).is_err() {
        return Err(ShortenerError::InvalidArgument(
            "URL contains characters that cannot be redirected to".to_string(),
        ));
    }
    Ok(())
}

fn expiry_from_now(ttl_minutes: i64) -> ShortenerResult<DateTime<Utc>> {
    if ttl_minutes <= 0 {
        return Err(ShortenerError::InvalidArgument(format!(
            "TTL must be a positive number of minutes, got {ttl_minutes}"
        )));
    }
    Duration::try_minutes(ttl_minutes)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| {
            ShortenerError::InvalidArgument(format!("TTL of {ttl_minutes} minutes is out of range"))
        })
}
