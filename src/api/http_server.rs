// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::auth::AuthProvider;
use super::generate::generate_image_handler;
use super::status::generation_status_handler;
use super::usage::{update_usage_handler, usage_handler};
use crate::provider::GenerationGateway;
use crate::quota::QuotaService;

#[derive(Clone)]
pub struct AppState {
    pub quota: Arc<QuotaService>,
    /// `None` when no provider key is configured; generation endpoints
    /// answer 503 in that case
    pub gateway: Option<Arc<dyn GenerationGateway>>,
    pub auth: Arc<dyn AuthProvider>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/flux/generate", post(generate_image_handler))
        .route("/api/flux/status", get(generation_status_handler))
        .route("/api/flux/usage", get(usage_handler))
        .route("/api/flux/usage/update", post(update_usage_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(listen_addr: &str, state: AppState) -> Result<()> {
    let app = build_router(state);

    let addr = listen_addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "providerConfigured": state.gateway.is_some(),
    }))
}
