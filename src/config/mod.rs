use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::shortener::ShortenerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// Prefix for short URLs handed back to clients, e.g. `http://localhost:5000`
    pub base_url: String,
    pub links: LinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// TTL applied when a shorten request does not carry one
    pub default_ttl_minutes: i64,
    pub short_code_max_attempts: u32,
    pub short_code_filler: char,
    /// Refuse to redirect inactive or expired mappings
    pub enforce_lifecycle: bool,
}

impl LinkConfig {
    pub const DEFAULT_TTL_MINUTES: i64 = 300;

    pub fn shortener(&self) -> ShortenerConfig {
        ShortenerConfig {
            max_attempts: self.short_code_max_attempts,
            filler: self.short_code_filler,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        let shortener = ShortenerConfig::default();
        Self {
            default_ttl_minutes: Self::DEFAULT_TTL_MINUTES,
            short_code_max_attempts: shortener.max_attempts,
            short_code_filler: shortener.filler,
            enforce_lifecycle: true,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match env_or("DATABASE_BACKEND", "sqlite").to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "memory" => DatabaseBackend::Memory,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres, memory"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url = env_or("DATABASE_URL", "sqlite://./hexlink.db");
        let max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 5u32)?;
        let acquire_timeout_secs = parse_env("DATABASE_ACQUIRE_TIMEOUT_SECS", 30u64)?;

        let host = env_or("HOST", "127.0.0.1");
        let port = parse_env("PORT", 5000u16)?;
        let base_url = env_or("BASE_URL", "http://localhost:5000")
            .trim_end_matches('/')
            .to_string();

        let defaults = LinkConfig::default();
        let default_ttl_minutes = parse_env("DEFAULT_TTL_MINUTES", defaults.default_ttl_minutes)?;
        if default_ttl_minutes <= 0 {
            bail!("DEFAULT_TTL_MINUTES must be positive, got {default_ttl_minutes}");
        }
        let short_code_max_attempts =
            parse_env("SHORT_CODE_MAX_ATTEMPTS", defaults.short_code_max_attempts)?;
        if short_code_max_attempts == 0 {
            bail!("SHORT_CODE_MAX_ATTEMPTS must be at least 1");
        }
        let short_code_filler = parse_env("SHORT_CODE_FILLER", defaults.short_code_filler)?;

        let enforce_lifecycle = parse_flag("ENFORCE_LINK_LIFECYCLE", defaults.enforce_lifecycle)?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
                acquire_timeout_secs,
            },
            server: ServerConfig { host, port },
            base_url,
            links: LinkConfig {
                default_ttl_minutes,
                short_code_max_attempts,
                short_code_filler,
                enforce_lifecycle,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_flag(key: &str, default: bool) -> anyhow::Result<bool> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => bail!("{key} must be a boolean, got '{raw}'"),
        },
        Err(_) => Ok(default),
    }
}
