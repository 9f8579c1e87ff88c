// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Third-party image-generation provider integration
//!
//! The provider is a black box: requests go in, an opaque request id and a
//! three-state status come back. This module normalizes its request/response
//! shapes and drives its queue to completion.

pub mod client;
pub mod poller;

pub use client::{normalize_image_urls, FluxClient, MODEL_ID};
pub use poller::{PollOutcome, StatusPoller, StatusSource, MAX_POLL_ATTEMPTS, POLL_INTERVAL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Processing state owned by the provider. This system never transitions
/// it, only observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Processing,
    Completed,
    Failed,
}

/// Normalized provider response shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Provider-assigned opaque id; empty when submission itself failed
    pub request_id: String,
    pub status: GenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn processing(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: GenerationStatus::Processing,
            image_url: None,
            image_urls: None,
            error: None,
        }
    }

    pub fn completed(request_id: impl Into<String>, image_urls: Vec<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: GenerationStatus::Completed,
            image_url: image_urls.first().cloned(),
            image_urls: Some(image_urls),
            error: None,
        }
    }

    pub fn failed(request_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: GenerationStatus::Failed,
            image_url: None,
            image_urls: None,
            error: Some(error.into()),
        }
    }
}

/// Caller-side errors from the gateway. Provider-side failures are folded
/// into a `failed` [`GenerationResult`] instead, so handlers only ever see
/// errors the caller can fix.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("at least one reference image is required")]
    MissingReferenceImage,
}

/// Seam between the HTTP handlers and the concrete provider client.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Submit a generation request and block until the provider reports a
    /// terminal state. Provider failures come back as a `failed` result.
    async fn submit(
        &self,
        prompt: &str,
        image_urls: &[String],
    ) -> Result<GenerationResult, GatewayError>;

    /// Query the status of a previously submitted request. Never errors;
    /// transport problems map to a `failed` result.
    async fn query_status(&self, request_id: &str) -> GenerationResult;

    /// Whether a submission without reference images is acceptable
    /// (demo mode substitutes placeholders).
    fn allows_empty_images(&self) -> bool {
        false
    }
}
