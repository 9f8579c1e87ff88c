// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Usage dashboard endpoints (authenticated callers only)

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::errors::ApiError;
use super::http_server::AppState;
use super::session::authenticated_user;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    pub used: u32,
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUsageRequest {
    #[serde(default)]
    pub increment: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUsageResponse {
    pub success: bool,
    pub used: u32,
    pub limit: u32,
}

/// GET /api/flux/usage - Current usage for the signed-in caller
///
/// Storage failures are absorbed by the quota service's memory fallback, so
/// this endpoint degrades to a zeroed counter instead of erroring.
pub async fn usage_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UsageResponse>, ApiError> {
    let user_id = authenticated_user(&headers, state.auth.as_ref())
        .await
        .ok_or_else(|| ApiError::Unauthorized("sign in required".to_string()))?;

    let summary = state.quota.usage(&user_id, true).await;
    Ok(Json(UsageResponse {
        used: summary.used,
        limit: summary.limit,
    }))
}

/// POST /api/flux/usage/update - Add to the signed-in caller's counter
pub async fn update_usage_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UpdateUsageRequest>,
) -> Result<Json<UpdateUsageResponse>, ApiError> {
    let user_id = authenticated_user(&headers, state.auth.as_ref())
        .await
        .ok_or_else(|| ApiError::Unauthorized("sign in required".to_string()))?;

    let increment = request.increment.unwrap_or(1);
    let update = state.quota.update(&user_id, true, increment).await;

    Ok(Json(UpdateUsageResponse {
        success: true,
        used: update.used,
        limit: update.limit,
    }))
}
