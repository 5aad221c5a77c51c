use axum::{routing::get, Router};
use std::sync::Arc;

use crate::shortener::Shortener;

use super::handlers::{redirect_url, RedirectState};

pub fn create_redirect_router(shortener: Arc<Shortener>, enforce_lifecycle: bool) -> Router {
    let state = Arc::new(RedirectState {
        shortener,
        enforce_lifecycle,
    });

    Router::new()
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
