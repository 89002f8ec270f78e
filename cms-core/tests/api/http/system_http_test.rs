//! Health, readiness, metrics and request-id tests

use super::{build_test_router, get_json, get_text, TestAppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cms_core::api::health::HealthResponse;
use tower::ServiceExt;

#[tokio::test]
async fn test_health() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<HealthResponse>) =
        get_json(&app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().status, "healthy");
}

#[tokio::test]
async fn test_ready() {
    let app = build_test_router(TestAppState::new());

    let (status, text) = get_text(&app, "/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "ready");
}

#[tokio::test]
async fn test_metrics_disabled() {
    let app = build_test_router(TestAppState::new());

    let (status, _) = get_text(&app, "/metrics").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = build_test_router(TestAppState::new());

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = build_test_router(TestAppState::new());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let request_id = response.headers().get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}
