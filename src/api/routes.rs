use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::shortener::Shortener;

use super::handlers::{code_info, current_time, shorten_url, AppState};

pub fn create_api_router(
    shortener: Arc<Shortener>,
    base_url: String,
    default_ttl_minutes: i64,
) -> Router {
    let state = Arc::new(AppState {
        shortener,
        base_url: base_url.trim_end_matches('/').to_string(),
        default_ttl_minutes,
    });

    Router::new()
        .route("/time", get(current_time))
        .route("/shorten", post(shorten_url))
        .route("/code_info", post(code_info))
        .route("/code_info/", post(code_info))
        .with_state(state)
}
