use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use hexlink::config::Config;
use hexlink::shortener::{Shortener, ShortenerError};
use hexlink::storage::{self, Storage};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hexlink-admin")]
#[command(about = "Hexlink short link management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL, extending its existing mapping if there is one
    Shorten {
        url: String,
        /// Minutes until the mapping expires (defaults to DEFAULT_TTL_MINUTES)
        #[arg(long)]
        ttl: Option<i64>,
    },
    /// Show the stored state of a short code or short URL
    Info { code: String },
    /// Push the expiration of a mapping to now + TTL
    Extend {
        code: String,
        /// Minutes from now
        #[arg(long)]
        ttl: i64,
    },
    /// Deactivate a mapping so redirects stop following it
    Deactivate { code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = storage::connect(&config.database).await?;
    run_and_close(cli.command, storage, &config).await
}

/// Run one command and release the pool whether or not it succeeded.
async fn run_and_close(
    command: Commands,
    storage: Arc<dyn Storage>,
    config: &Config,
) -> Result<()> {
    let shortener = Shortener::new(Arc::clone(&storage), config.links.shortener());
    let result = run(command, &shortener, config).await;
    storage.close().await;
    result
}

async fn run(command: Commands, shortener: &Shortener, config: &Config) -> Result<()> {
    match command {
        Commands::Shorten { url, ttl } => {
            let ttl = ttl.unwrap_or(config.links.default_ttl_minutes);
            let code = shortener.shorten(&url, ttl).await?;
            println!("{}/f/{}", config.base_url, code);
        }
        Commands::Info { code } => match shortener.resolve_short_url(&code).await {
            Ok(mapping) => {
                let expires = mapping
                    .expires_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                println!("{:<12} {}", "Code", mapping.short_code);
                println!("{:<12} {}", "URL", mapping.original_url);
                println!("{:<12} {}", "Created", mapping.created_at.to_rfc3339());
                println!("{:<12} {}", "Expires", expires);
                println!("{:<12} {}", "Active", mapping.is_active);
                println!(
                    "{:<12} {}",
                    "Resolvable",
                    mapping.is_resolvable_at(Utc::now())
                );
            }
            Err(ShortenerError::NotFound(code)) => {
                println!("⚠ Short code '{}' not found", code);
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Extend { code, ttl } => {
            if shortener.extend(&code, ttl).await? {
                println!("✓ Extended '{}' by {} minutes from now", code, ttl);
            } else {
                println!("⚠ Short code '{}' not found", code);
            }
        }
        Commands::Deactivate { code } => {
            if shortener.deactivate(&code).await? {
                println!("✓ Deactivated '{}'", code);
            } else {
                println!("⚠ Short code '{}' not found", code);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use hexlink::config::{DatabaseBackend, DatabaseConfig, LinkConfig, ServerConfig};
    use hexlink::models::UrlMapping;
    use hexlink::storage::{MemoryStorage, StorageResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct ClosingStorage {
        inner: MemoryStorage,
        closed: AtomicUsize,
    }

    #[async_trait]
    impl Storage for ClosingStorage {
        async fn init(&self) -> Result<()> {
            self.inner.init().await
        }

        async fn insert(
            &self,
            short_code: &str,
            original_url: &str,
            expires_at: Option<DateTime<Utc>>,
            is_active: bool,
        ) -> StorageResult<i64> {
            self.inner
                .insert(short_code, original_url, expires_at, is_active)
                .await
        }

        async fn fetch_by_code(&self, short_code: &str) -> StorageResult<Option<UrlMapping>> {
            self.inner.fetch_by_code(short_code).await
        }

        async fn fetch_code_by_url(&self, original_url: &str) -> StorageResult<Option<String>> {
            self.inner.fetch_code_by_url(original_url).await
        }

        async fn extend_expiration(
            &self,
            short_code: &str,
            expires_at: DateTime<Utc>,
        ) -> StorageResult<bool> {
            self.inner.extend_expiration(short_code, expires_at).await
        }

        async fn deactivate(&self, short_code: &str) -> StorageResult<bool> {
            self.inner.deactivate(short_code).await
        }

        async fn exists(&self, short_code: &str) -> StorageResult<bool> {
            self.inner.exists(short_code).await
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_config() -> Config {
        Config {
            database: DatabaseConfig {
                backend: DatabaseBackend::Memory,
                url: String::new(),
                max_connections: 1,
                acquire_timeout_secs: 30,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            base_url: "http://localhost:5000".to_string(),
            links: LinkConfig::default(),
        }
    }

    #[tokio::test]
    async fn storage_is_closed_after_a_failed_command() {
        let storage = Arc::new(ClosingStorage::default());

        let result = run_and_close(
            Commands::Extend {
                code: "abcde".to_string(),
                ttl: 0,
            },
            storage.clone(),
            &test_config(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(storage.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn storage_is_closed_after_a_successful_command() {
        let storage = Arc::new(ClosingStorage::default());

        run_and_close(
            Commands::Shorten {
                url: "https://example.com".to_string(),
                ttl: Some(60),
            },
            storage.clone(),
            &test_config(),
        )
        .await
        .unwrap();

        assert_eq!(storage.closed.load(Ordering::SeqCst), 1);
        assert_eq!(storage.inner.len(), 1);
    }
}
