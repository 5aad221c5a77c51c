use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UrlMapping {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl UrlMapping {
    /// Whether a caller honoring the link lifecycle should follow this mapping at `now`.
    ///
    /// Deactivated mappings never resolve; a mapping without `expires_at` never expires.
    pub fn is_resolvable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: Option<String>,
    /// Minutes until the mapping expires
    pub ttl: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_code: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeInfoRequest {
    pub short_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CodeInfoResponse {
    pub original_url: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<UrlMapping> for CodeInfoResponse {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            original_url: mapping.original_url,
            is_active: mapping.is_active,
            expires_at: mapping.expires_at,
        }
    }
}
