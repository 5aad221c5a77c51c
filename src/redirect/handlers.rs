use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::shortener::{Shortener, ShortenerError};

pub struct RedirectState {
    pub shortener: Arc<Shortener>,
    /// When false, any stored mapping is followed regardless of activity or expiry
    pub enforce_lifecycle: bool,
}

/// Redirect to original URL with a 307.
///
/// Unknown codes answer 404. With the lifecycle policy enforced, inactive or
/// expired mappings answer 410 Gone rather than 404, so clients can tell a
/// retired link from one that never existed.
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
) -> Response {
    match state.shortener.resolve(&code).await {
        Ok(mapping) => {
            if state.enforce_lifecycle {
                let now = Utc::now();
                if !mapping.is_active {
                    return (StatusCode::GONE, "This link has been deactivated").into_response();
                }
                if mapping.is_expired_at(now) {
                    return (StatusCode::GONE, "This link has expired").into_response();
                }
            }

            Redirect::temporary(&mapping.original_url).into_response()
        }
        Err(ShortenerError::NotFound(_)) => (StatusCode::NOT_FOUND, "URL not found").into_response(),
        Err(e) => {
            tracing::error!(short_code = %code, error = %e, "failed to resolve short code");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
