//! HTTP API integration tests
//!
//! These tests exercise `/api/shorten`, `/api/code_info/` and `/api/time`
//! through the assembled router.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hexlink::config::{Config, DatabaseBackend, DatabaseConfig, LinkConfig, ServerConfig};
use hexlink::create_app;
use hexlink::shortener::{Shortener, ShortenerConfig};
use hexlink::storage::{SqliteStorage, Storage};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create test storage
async fn create_test_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

/// Helper to create test config
fn create_test_config() -> Config {
    Config {
        database: DatabaseConfig {
            backend: DatabaseBackend::Sqlite,
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_secs: 30,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
        },
        base_url: "http://sho.rt".to_string(),
        links: LinkConfig::default(),
    }
}

async fn create_test_app() -> (Router, Arc<Shortener>) {
    let shortener = Arc::new(Shortener::new(
        create_test_storage().await,
        ShortenerConfig::default(),
    ));
    let app = create_app(Arc::clone(&shortener), &create_test_config());
    (app, shortener)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_shorten_returns_short_url() {
    let (app, shortener) = create_test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/shorten",
            r#"{"url": "https://example.com/docs", "ttl": 60}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let code = body["short_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 5);
    assert_eq!(
        body["short_url"].as_str().unwrap(),
        format!("http://sho.rt/f/{code}")
    );

    let mapping = shortener.resolve(&code).await.unwrap();
    assert_eq!(mapping.original_url, "https://example.com/docs");
}

#[tokio::test]
async fn test_shorten_applies_default_ttl() {
    let (app, shortener) = create_test_app().await;
    let before = chrono::Utc::now();

    let response = app
        .oneshot(post_json("/api/shorten", r#"{"url": "https://example.com/default"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    let code = body["short_code"].as_str().unwrap();
    let expires_at = shortener.resolve(code).await.unwrap().expires_at.unwrap();
    let ttl = expires_at - before;
    assert!(ttl >= chrono::Duration::minutes(LinkConfig::DEFAULT_TTL_MINUTES));
    assert!(ttl < chrono::Duration::minutes(LinkConfig::DEFAULT_TTL_MINUTES + 1));
}

#[tokio::test]
async fn test_shorten_same_url_twice_returns_same_code() {
    let (app, _) = create_test_app().await;

    let mut codes = vec![];
    for ttl in [10, 20] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/shorten",
                &format!(r#"{{"url": "https://example.com/twice", "ttl": {ttl}}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        codes.push(json_body(response).await["short_code"].clone());
    }

    assert_eq!(codes[0], codes[1]);
}

#[tokio::test]
async fn test_shorten_requires_url() {
    let (app, _) = create_test_app().await;

    for body in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": null, "ttl": 5}"#] {
        let response = app
            .clone()
            .oneshot(post_json("/api/shorten", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let json = json_body(response).await;
        assert_eq!(json["error"], "URL is required");
    }
}

#[tokio::test]
async fn test_shorten_rejects_non_positive_ttl() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/shorten",
            r#"{"url": "https://example.com", "ttl": 0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shorten_rejects_url_that_cannot_be_redirected_to() {
    let (app, shortener) = create_test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/shorten",
            r#"{"url": "https://example.com/a\nb"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(shortener
        .storage()
        .fetch_code_by_url("https://example.com/a\nb")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_code_info_reports_stored_state() {
    let (app, shortener) = create_test_app().await;
    let code = shortener
        .shorten("https://example.com/info", 30)
        .await
        .unwrap();
    shortener.deactivate(&code).await.unwrap();

    for uri in ["/api/code_info/", "/api/code_info"] {
        let response = app
            .clone()
            .oneshot(post_json(uri, &format!(r#"{{"short_code": "{code}"}}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = json_body(response).await;
        assert_eq!(body["original_url"], "https://example.com/info");
        assert_eq!(body["is_active"], false);
        assert!(body["expires_at"].is_string());
    }
}

#[tokio::test]
async fn test_code_info_errors() {
    let (app, _) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/code_info/", r#"{}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Short code is required");

    let response = app
        .oneshot(post_json(
            "/api/code_info/",
            r#"{"short_code": "doesnotexist"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "URL not found");
}

#[tokio::test]
async fn test_time_endpoint() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/time")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let time = body["time"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "OK");
}

#[tokio::test]
async fn test_concurrent_shorten_requests() {
    let (app, _) = create_test_app().await;
    let mut handles = vec![];

    for i in 0..10 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let response = app
                .oneshot(post_json(
                    "/api/shorten",
                    &format!(r#"{{"url": "https://example.com/c/{i}"}}"#),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            json_body(response).await["short_code"]
                .as_str()
                .unwrap()
                .to_string()
        }));
    }

    let mut codes = std::collections::HashSet::new();
    for handle in handles {
        codes.insert(handle.await.unwrap());
    }
    assert_eq!(codes.len(), 10, "every URL should get its own code");
}
