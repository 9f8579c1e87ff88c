// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation status endpoint

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::warn;

use super::errors::ApiError;
use super::http_server::AppState;
use crate::provider::{GenerationResult, GenerationStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A request id must look like a UUID or a 10+ char alphanumeric/hyphen/
/// underscore token; anything else is rejected before the provider is asked.
pub fn is_valid_request_id(id: &str) -> bool {
    static UUID_RE: OnceLock<Regex> = OnceLock::new();
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

    let uuid = UUID_RE.get_or_init(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
    });
    let token = TOKEN_RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{10,}$").unwrap());

    uuid.is_match(id) || token.is_match(id)
}

/// GET /api/flux/status?requestId=<id> - Query generation status
///
/// A `failed` result whose error mentions a timeout maps to 408; other
/// failures with an error map to 500. Everything else passes through as
/// the normalized result body.
pub async fn generation_status_handler(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<(StatusCode, Json<GenerationResult>), ApiError> {
    let request_id = query
        .request_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("missing requestId parameter".to_string()))?;

    if !is_valid_request_id(&request_id) {
        return Err(ApiError::InvalidRequest(
            "invalid requestId format".to_string(),
        ));
    }

    let gateway = state.gateway.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("image generation is not configured".to_string())
    })?;

    let result = gateway.query_status(&request_id).await;

    let code = match (&result.status, &result.error) {
        (GenerationStatus::Failed, Some(error)) => {
            warn!("status check for {} failed: {}", request_id, error);
            if error.contains("timed out") || error.contains("timeout") {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        _ => StatusCode::OK,
    };

    Ok((code, Json(result)))
}
