// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! fal.ai queue client for Flux Kontext image generation

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::poller::{PollOutcome, StatusPoller, StatusSource};
use super::{GatewayError, GenerationGateway, GenerationResult};

/// Provider model identifier
pub const MODEL_ID: &str = "fal-ai/flux-pro/kontext/max/multi";

const QUEUE_BASE_URL: &str = "https://queue.fal.run";

/// Placeholder reference images substituted in demo mode when the caller
/// supplies none
const DEMO_IMAGE_URLS: [&str; 2] = [
    "https://v3.fal.media/files/penguin/XoW0qavfF-ahg-jX4BMyL_image.webp",
    "https://v3.fal.media/files/tiger/bml6YA7DWJXOigadvxk75_image.webp",
];

/// Normalize reference image entries for the provider: `data:` URIs and
/// http(s) URLs pass through unchanged, anything else is treated as raw
/// base64 and wrapped as a JPEG data URI.
pub fn normalize_image_urls(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            if entry.starts_with("data:") || entry.starts_with("http") {
                entry.clone()
            } else {
                format!("data:image/jpeg;base64,{}", entry)
            }
        })
        .collect()
}

// --- Provider wire shapes ---

#[derive(Debug, Deserialize)]
struct QueueSubmitResponse {
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct QueueStatusResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueueResultResponse {
    #[serde(default)]
    images: Vec<QueueImage>,
}

#[derive(Debug, Deserialize)]
struct QueueImage {
    url: String,
}

/// Provider-supplied error detail when present, generic message otherwise.
fn failure_detail(error: Option<String>) -> String {
    error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "generation failed".to_string())
}

/// Client for the fal.ai queue API.
pub struct FluxClient {
    client: Client,
    base_url: String,
    api_key: String,
    demo_mode: bool,
}

impl FluxClient {
    pub fn new(api_key: &str, demo_mode: bool) -> Result<Self> {
        Self::with_base_url(QUEUE_BASE_URL, api_key, demo_mode)
    }

    /// Custom queue endpoint, for tests against a local stub.
    pub fn with_base_url(base_url: &str, api_key: &str, demo_mode: bool) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(
            "Flux client configured: model={}, demo_mode={}",
            MODEL_ID, demo_mode
        );

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            demo_mode,
        })
    }

    fn status_url(&self, request_id: &str) -> String {
        format!(
            "{}/{}/requests/{}/status",
            self.base_url, MODEL_ID, request_id
        )
    }

    fn result_url(&self, request_id: &str) -> String {
        format!("{}/{}/requests/{}", self.base_url, MODEL_ID, request_id)
    }

    async fn enqueue(&self, prompt: &str, image_urls: &[String]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, MODEL_ID);
        let body = serde_json::json!({
            "prompt": prompt,
            "image_urls": image_urls,
        });
        debug!("Flux enqueue POST {} images={}", url, image_urls.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("provider returned {}: {}", status, text));
        }

        let submitted: QueueSubmitResponse = response.json().await?;
        Ok(submitted.request_id)
    }

    async fn fetch_status(&self, request_id: &str) -> Result<GenerationResult> {
        let response = self
            .client
            .get(self.status_url(request_id))
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("provider returned {}: {}", status, text));
        }

        let queue_status: QueueStatusResponse = response.json().await?;
        // Case-insensitive three-state mapping; unrecognized states count
        // as still processing
        match queue_status.status.to_uppercase().as_str() {
            "COMPLETED" => self.fetch_result(request_id).await,
            "FAILED" => Ok(GenerationResult::failed(
                request_id,
                failure_detail(queue_status.error),
            )),
            _ => Ok(GenerationResult::processing(request_id)),
        }
    }

    async fn fetch_result(&self, request_id: &str) -> Result<GenerationResult> {
        let response = self
            .client
            .get(self.result_url(request_id))
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("provider returned {}: {}", status, text));
        }

        let payload: QueueResultResponse = response.json().await?;
        let urls: Vec<String> = payload.images.into_iter().map(|img| img.url).collect();
        Ok(GenerationResult::completed(request_id, urls))
    }
}

struct QueueStatusSource<'a> {
    client: &'a FluxClient,
    request_id: String,
}

#[async_trait]
impl StatusSource for QueueStatusSource<'_> {
    async fn poll(&self) -> GenerationResult {
        self.client.query_status(&self.request_id).await
    }
}

#[async_trait]
impl GenerationGateway for FluxClient {
    async fn submit(
        &self,
        prompt: &str,
        image_urls: &[String],
    ) -> Result<GenerationResult, GatewayError> {
        let image_urls = if image_urls.is_empty() {
            if !self.demo_mode {
                return Err(GatewayError::MissingReferenceImage);
            }
            DEMO_IMAGE_URLS.iter().map(|u| u.to_string()).collect()
        } else {
            normalize_image_urls(image_urls)
        };

        info!(
            "submitting generation request: prompt_len={}, images={}",
            prompt.len(),
            image_urls.len()
        );

        let request_id = match self.enqueue(prompt, &image_urls).await {
            Ok(id) => id,
            Err(e) => {
                warn!("generation submission failed: {e:#}");
                return Ok(GenerationResult::failed(
                    "",
                    format!("failed to submit generation request: {e}"),
                ));
            }
        };

        // Drive the provider queue to a terminal state before returning,
        // so submission is synchronous from the handler's point of view.
        let source = QueueStatusSource {
            client: self,
            request_id: request_id.clone(),
        };
        let outcome = StatusPoller::default()
            .run(&source, CancellationToken::new())
            .await;

        Ok(match outcome {
            PollOutcome::Completed {
                image_url,
                image_urls,
            } => {
                let mut result = GenerationResult::completed(&request_id, image_urls);
                result.image_url = Some(image_url);
                result
            }
            PollOutcome::Failed { error } => GenerationResult::failed(&request_id, error),
            PollOutcome::TimedOut => GenerationResult::failed(
                &request_id,
                "generation timed out waiting for the provider",
            ),
            PollOutcome::Cancelled => GenerationResult::failed(&request_id, "generation cancelled"),
        })
    }

    async fn query_status(&self, request_id: &str) -> GenerationResult {
        match self.fetch_status(request_id).await {
            Ok(result) => result,
            Err(e) => {
                warn!("status check failed for {}: {e:#}", request_id);
                GenerationResult::failed(request_id, "status check failed")
            }
        }
    }

    fn allows_empty_images(&self) -> bool {
        self.demo_mode
    }
}
