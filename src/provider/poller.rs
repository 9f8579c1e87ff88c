// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-interval status poller for generation requests
//!
//! Polls a status source every two seconds until the provider reports a
//! terminal state or the attempt cap is reached. A new submission cancels
//! the previous poll through its `CancellationToken` instead of leaving a
//! stale timer chain running.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{GenerationResult, GenerationStatus};

/// Delay between consecutive status queries
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Hard cap on queries for one request (60 * 2s ~= 2 minutes)
pub const MAX_POLL_ATTEMPTS: u32 = 60;

/// Something that can be asked for the current generation status.
/// Production wires this to the provider's queue; tests script sequences.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn poll(&self) -> GenerationResult;
}

/// Terminal outcome of a polling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed {
        image_url: String,
        image_urls: Vec<String>,
    },
    Failed {
        error: String,
    },
    /// Attempt cap reached without a terminal status
    TimedOut,
    /// Cancelled through the token, e.g. by a newer submission
    Cancelled,
}

pub struct StatusPoller {
    interval: Duration,
    max_attempts: u32,
}

impl StatusPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Poll until terminal, capped, or cancelled. The first query fires
    /// immediately; subsequent ones wait out the interval.
    ///
    /// A `completed` status without an image URL is treated as still in
    /// flight: the provider occasionally reports completion before the
    /// result payload is reachable.
    pub async fn run(&self, source: &dyn StatusSource, cancel: CancellationToken) -> PollOutcome {
        for attempt in 0..self.max_attempts {
            if cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }

            if attempt > 0 {
                tokio::select! {
                    _ = cancel.cancelled() => return PollOutcome::Cancelled,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }

            let result = source.poll().await;
            debug!(
                "poll attempt {}/{}: status={:?}",
                attempt + 1,
                self.max_attempts,
                result.status
            );

            match result.status {
                GenerationStatus::Completed => {
                    if let Some(image_url) = result.image_url.filter(|u| !u.is_empty()) {
                        return PollOutcome::Completed {
                            image_url,
                            image_urls: result.image_urls.unwrap_or_default(),
                        };
                    }
                }
                GenerationStatus::Failed => {
                    return PollOutcome::Failed {
                        error: result
                            .error
                            .unwrap_or_else(|| "generation failed".to_string()),
                    };
                }
                GenerationStatus::Processing => {}
            }
        }

        PollOutcome::TimedOut
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(POLL_INTERVAL, MAX_POLL_ATTEMPTS)
    }
}
