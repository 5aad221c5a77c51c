use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hexlink::config::Config;
use hexlink::shortener::Shortener;
use hexlink::{create_app, storage};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hexlink=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    let storage = storage::connect(&config.database).await?;
    info!("Database initialized successfully");

    let shortener = Arc::new(Shortener::new(
        Arc::clone(&storage),
        config.links.shortener(),
    ));
    info!(
        default_ttl_minutes = config.links.default_ttl_minutes,
        max_attempts = config.links.short_code_max_attempts,
        enforce_lifecycle = config.links.enforce_lifecycle,
        "Shortener ready"
    );

    let app = create_app(shortener, &config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Listening on http://{}", addr);
    info!("   - API endpoints available at http://{}/api/...", addr);
    info!("   - Short links resolve under {}/f/<code>", config.base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing storage");
    storage.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
