// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation endpoint handler

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info, warn};

use super::request::GenerateRequest;
use super::response::GenerateResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::session::resolve_identity;
use crate::provider::{GatewayError, GenerationStatus};

/// POST /api/flux/generate - Submit an image generation request
///
/// Pipeline:
/// 1. Validate prompt and image list
/// 2. Resolve caller identity (bearer token, else session cookie)
/// 3. Check the quota strictly before submission (429 when exhausted)
/// 4. Submit to the provider and wait for its terminal state
/// 5. Count the call (pay-per-attempt) and respond with the request id
pub async fn generate_image_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(request): Json<GenerateRequest>,
) -> Result<(CookieJar, Json<GenerateResponse>), ApiError> {
    debug!(
        "generation request received: prompt_len={}, images={}",
        request.prompt.len(),
        request.image_urls.len()
    );

    let allow_empty_images = state
        .gateway
        .as_ref()
        .map(|g| g.allows_empty_images())
        .unwrap_or(false);

    if let Err(e) = request.validate(allow_empty_images) {
        warn!("generation request validation failed: {}", e);
        return Err(ApiError::InvalidRequest(e));
    }

    let gateway = state.gateway.as_ref().ok_or_else(|| {
        warn!("generation requested but no provider key is configured");
        ApiError::ServiceUnavailable("image generation is not configured".to_string())
    })?;

    let (jar, identity) = resolve_identity(&headers, jar, state.auth.as_ref()).await;

    let quota = state
        .quota
        .check(&identity.identifier, identity.is_authenticated())
        .await;
    if !quota.can_call {
        info!(
            "quota exhausted for identifier={} used={}/{}",
            identity.identifier, quota.used, quota.limit
        );
        return Err(ApiError::QuotaExceeded {
            requires_login: !identity.is_authenticated(),
        });
    }

    let result = gateway
        .submit(&request.prompt, &request.image_urls)
        .await
        .map_err(|e| match e {
            GatewayError::MissingReferenceImage => ApiError::InvalidRequest(e.to_string()),
        })?;

    if result.status == GenerationStatus::Failed {
        let message = result
            .error
            .unwrap_or_else(|| "image generation failed".to_string());
        warn!("generation submission failed: {}", message);
        return Err(ApiError::ProviderFailure(message));
    }

    // A submitted request consumes one call even if it fails downstream
    let update = state
        .quota
        .update(&identity.identifier, identity.is_authenticated(), 1)
        .await;

    info!(
        "generation submitted: request_id={}, remaining={}",
        result.request_id, update.remaining_calls
    );

    Ok((
        jar,
        Json(GenerateResponse {
            request_id: result.request_id,
            status: result.status,
            remaining_calls: update.remaining_calls,
            image_url: result.image_url,
            image_urls: result.image_urls,
        }),
    ))
}
