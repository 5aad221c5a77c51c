use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::config::Config;
use crate::redirect::{create_redirect_router, handlers::health_check};
use crate::shortener::Shortener;

/// Assemble the public router: `/api/...` for the JSON API and `/f/{code}` for redirects.
pub fn create_app(shortener: Arc<Shortener>, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api",
            create_api_router(
                Arc::clone(&shortener),
                config.base_url.clone(),
                config.links.default_ttl_minutes,
            ),
        )
        .nest(
            "/f",
            create_redirect_router(shortener, config.links.enforce_lifecycle),
        )
        .layer(TraceLayer::new_for_http())
}
