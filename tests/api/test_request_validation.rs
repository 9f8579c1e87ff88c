// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Validation tests for the generate endpoint and its request type

use axum::http::StatusCode;
use kontext_gateway::api::{build_router, GenerateRequest, SESSION_COOKIE};
use kontext_gateway::api::generate::MAX_PROMPT_CHARS;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use super::support::{app_state, default_auth, generate_request, json_body, FakeStore, StubGateway};

#[test]
fn validate_rejects_empty_prompt() {
    let request = GenerateRequest {
        prompt: "".to_string(),
        image_urls: vec!["https://example.com/a.jpg".to_string()],
    };
    assert!(request.validate(false).is_err());
}

#[test]
fn validate_rejects_whitespace_only_prompt() {
    let request = GenerateRequest {
        prompt: "   \n\t ".to_string(),
        image_urls: vec!["https://example.com/a.jpg".to_string()],
    };
    assert!(request.validate(false).is_err());
}

#[test]
fn validate_rejects_oversized_prompt() {
    let request = GenerateRequest {
        prompt: "x".repeat(MAX_PROMPT_CHARS + 1),
        image_urls: vec!["https://example.com/a.jpg".to_string()],
    };
    let err = request.validate(false).unwrap_err();
    assert!(err.contains("500"));
}

#[test]
fn validate_accepts_prompt_at_the_limit() {
    let request = GenerateRequest {
        prompt: "x".repeat(MAX_PROMPT_CHARS),
        image_urls: vec!["https://example.com/a.jpg".to_string()],
    };
    assert!(request.validate(false).is_ok());
}

#[test]
fn validate_rejects_missing_images() {
    let request = GenerateRequest {
        prompt: "a castle at dusk".to_string(),
        image_urls: vec![],
    };
    assert!(request.validate(false).is_err());
}

#[test]
fn validate_allows_missing_images_in_demo_mode() {
    let request = GenerateRequest {
        prompt: "a castle at dusk".to_string(),
        image_urls: vec![],
    };
    assert!(request.validate(true).is_ok());
}

#[test]
fn validate_rejects_blank_image_entries() {
    let request = GenerateRequest {
        prompt: "a castle at dusk".to_string(),
        image_urls: vec!["https://example.com/a.jpg".to_string(), "  ".to_string()],
    };
    assert!(request.validate(false).is_err());
}

#[tokio::test]
async fn empty_prompt_returns_400_and_leaves_the_counter_untouched() {
    let store = Arc::new(FakeStore::default());
    let gateway = Arc::new(StubGateway::completing("req-abcdef12345", "https://x/y.png"));
    let app = build_router(app_state(store.clone(), Some(gateway.clone()), default_auth()));

    let mut request = generate_request(json!({
        "prompt": "",
        "image_urls": ["https://example.com/ref.jpg"],
    }));
    request.headers_mut().insert(
        "cookie",
        format!("{}=existing-session-token", SESSION_COOKIE)
            .parse()
            .unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("prompt"));

    assert_eq!(gateway.submit_count(), 0);
    assert!(store.record_for("existing-session-token").is_none());
}

#[tokio::test]
async fn missing_images_return_400() {
    let store = Arc::new(FakeStore::default());
    let gateway = Arc::new(StubGateway::completing("req-abcdef12345", "https://x/y.png"));
    let app = build_router(app_state(store, Some(gateway.clone()), default_auth()));

    let response = app
        .oneshot(generate_request(json!({
            "prompt": "a castle at dusk",
            "image_urls": [],
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(gateway.submit_count(), 0);
}

#[tokio::test]
async fn missing_body_fields_default_and_fail_validation() {
    let store = Arc::new(FakeStore::default());
    let gateway = Arc::new(StubGateway::completing("req-abcdef12345", "https://x/y.png"));
    let app = build_router(app_state(store, Some(gateway), default_auth()));

    let response = app.oneshot(generate_request(json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
