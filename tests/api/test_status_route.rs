// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for GET /api/flux/status

use axum::body::Body;
use axum::http::{Request, StatusCode};
use kontext_gateway::api::build_router;
use kontext_gateway::provider::GenerationResult;
use std::sync::Arc;
use tower::ServiceExt;

use super::support::{app_state, default_auth, json_body, FakeStore, StubGateway};

fn status_request(request_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/api/flux/status?requestId={}", request_id))
        .body(Body::empty())
        .unwrap()
}

fn gateway_with_status(status_result: GenerationResult) -> Arc<StubGateway> {
    Arc::new(
        StubGateway::completing("req-abcdef12345", "https://x/y.png").with_status(status_result),
    )
}

#[tokio::test]
async fn completed_status_reports_image_urls() {
    let gateway = gateway_with_status(GenerationResult::completed(
        "req-abcdef12345",
        vec![
            "https://example.com/out-1.png".to_string(),
            "https://example.com/out-2.png".to_string(),
        ],
    ));
    let app = build_router(app_state(
        Arc::new(FakeStore::default()),
        Some(gateway),
        default_auth(),
    ));

    let response = app.oneshot(status_request("req-abcdef12345")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["imageUrl"], "https://example.com/out-1.png");
    assert_eq!(body["imageUrls"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn processing_status_passes_through() {
    let gateway = gateway_with_status(GenerationResult::processing("req-abcdef12345"));
    let app = build_router(app_state(
        Arc::new(FakeStore::default()),
        Some(gateway),
        default_auth(),
    ));

    let response = app.oneshot(status_request("req-abcdef12345")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "processing");
    assert!(body.get("imageUrl").is_none());
}

#[tokio::test]
async fn failed_status_maps_to_500() {
    let gateway = gateway_with_status(GenerationResult::failed(
        "req-abcdef12345",
        "status check failed",
    ));
    let app = build_router(app_state(
        Arc::new(FakeStore::default()),
        Some(gateway),
        default_auth(),
    ));

    let response = app.oneshot(status_request("req-abcdef12345")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["status"], "failed");
    assert_eq!(body["error"], "status check failed");
}

#[tokio::test]
async fn timeout_errors_map_to_408() {
    let gateway = gateway_with_status(GenerationResult::failed(
        "req-abcdef12345",
        "generation timed out waiting for the provider",
    ));
    let app = build_router(app_state(
        Arc::new(FakeStore::default()),
        Some(gateway),
        default_auth(),
    ));

    let response = app.oneshot(status_request("req-abcdef12345")).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn malformed_request_id_is_rejected_before_any_provider_call() {
    let gateway = gateway_with_status(GenerationResult::processing("req-abcdef12345"));
    let app = build_router(app_state(
        Arc::new(FakeStore::default()),
        Some(gateway.clone()),
        default_auth(),
    ));

    let response = app.oneshot(status_request("ab")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(gateway.status_count(), 0);
}

#[tokio::test]
async fn missing_request_id_is_a_400() {
    let gateway = gateway_with_status(GenerationResult::processing("req-abcdef12345"));
    let app = build_router(app_state(
        Arc::new(FakeStore::default()),
        Some(gateway),
        default_auth(),
    ));

    let request = Request::builder()
        .method("GET")
        .uri("/api/flux/status")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uuid_request_ids_are_accepted() {
    let gateway = gateway_with_status(GenerationResult::processing(
        "3fa85f64-5717-4562-b3fc-2c963f66afa6",
    ));
    let app = build_router(app_state(
        Arc::new(FakeStore::default()),
        Some(gateway),
        default_auth(),
    ));

    let response = app
        .oneshot(status_request("3fa85f64-5717-4562-b3fc-2c963f66afa6"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
