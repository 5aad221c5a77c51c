use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{CodeInfoRequest, CodeInfoResponse, ShortenRequest, ShortenResponse};
use crate::shortener::{Shortener, ShortenerError};

pub struct AppState {
    pub shortener: Arc<Shortener>,
    pub base_url: String,
    pub default_ttl_minutes: i64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct TimeResponse {
    pub time: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<ShortenerError> for ApiError {
    fn from(err: ShortenerError) -> Self {
        match err {
            ShortenerError::InvalidArgument(message) => {
                error_response(StatusCode::BAD_REQUEST, message)
            }
            ShortenerError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "URL not found"),
            ShortenerError::CodeSpaceExhausted { attempts } => {
                tracing::error!(attempts, "short code space exhausted");
                error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Failed to generate unique short code",
                )
            }
            ShortenerError::StoreUnavailable(e) => {
                tracing::error!(error = %e, "storage failure");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage unavailable")
            }
        }
    }
}

/// Shorten a URL, reusing and extending an existing mapping when there is one
pub async fn shorten_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), ApiError> {
    let url = payload
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "URL is required"))?;
    let ttl = payload.ttl.unwrap_or(state.default_ttl_minutes);

    let short_code = state.shortener.shorten(&url, ttl).await?;

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_url: format!("{}/f/{}", state.base_url, short_code),
            short_code,
        }),
    ))
}

/// Report the stored state of a short code without applying the lifecycle policy
pub async fn code_info(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CodeInfoRequest>,
) -> Result<Json<CodeInfoResponse>, ApiError> {
    let short_code = payload
        .short_code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Short code is required"))?;

    let mapping = state.shortener.resolve(&short_code).await?;
    Ok(Json(mapping.into()))
}

pub async fn current_time() -> Json<TimeResponse> {
    Json(TimeResponse {
        time: chrono::Utc::now().to_rfc3339(),
    })
}
