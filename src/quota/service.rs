// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Quota service composing the persistent store and the memory fallback

use anyhow::Result;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::memory::MemoryUsageCache;
use super::store::{UsageRecord, UsageStore};

/// Calls per 24-hour window for anonymous (session-cookie) identifiers
pub const MAX_ANONYMOUS_CALLS: u32 = 20;
/// Calls per 24-hour window for authenticated identifiers
pub const MAX_AUTHENTICATED_CALLS: u32 = 100;
/// Rolling reset window
pub const RESET_PERIOD_HOURS: i64 = 24;

const LIMIT_REACHED_MESSAGE: &str =
    "API call limit reached. Sign in for a higher limit or try again later.";

/// Answer to "can this identifier call now?"
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub can_call: bool,
    pub used: u32,
    pub limit: u32,
    pub remaining_calls: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Post-increment view returned by [`QuotaService::update`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaUpdate {
    pub used: u32,
    pub limit: u32,
    pub remaining_calls: u32,
}

/// Read-only usage view for the dashboard endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub used: u32,
    pub limit: u32,
    pub remaining_calls: u32,
}

/// Per-identifier call accounting with a rolling 24-hour window.
///
/// The persistent store is authoritative; any store error makes the
/// operation fall through to the injected memory cache for this process
/// only. No cross-request locking is performed, so concurrent increments
/// for one identifier can lose updates. That is accepted for a soft usage
/// limit and must not be read as a security boundary.
pub struct QuotaService {
    store: Option<Arc<dyn UsageStore>>,
    cache: MemoryUsageCache,
    reset_period: Duration,
}

impl QuotaService {
    pub fn new(store: Option<Arc<dyn UsageStore>>, cache: MemoryUsageCache) -> Self {
        Self {
            store,
            cache,
            reset_period: Duration::hours(RESET_PERIOD_HOURS),
        }
    }

    pub fn limit_for(is_authenticated: bool) -> u32 {
        if is_authenticated {
            MAX_AUTHENTICATED_CALLS
        } else {
            MAX_ANONYMOUS_CALLS
        }
    }

    /// Check whether the identifier may make a call right now.
    ///
    /// Idempotent with respect to the lazy reset: two checks with no
    /// intervening update never change `used`.
    pub async fn check(&self, identifier: &str, is_authenticated: bool) -> QuotaStatus {
        let limit = Self::limit_for(is_authenticated);

        let Some(store) = &self.store else {
            return self.cached_status(identifier, limit);
        };

        match self.current_count(store.as_ref(), identifier).await {
            Ok(used) => Self::status_for(used, limit),
            Err(e) => {
                warn!("usage store check failed, using memory cache: {e:#}");
                self.cached_status(identifier, limit)
            }
        }
    }

    /// Record `increment` calls for the identifier and return the
    /// post-increment counts, remaining clamped to >= 0.
    pub async fn update(&self, identifier: &str, is_authenticated: bool, increment: u32) -> QuotaUpdate {
        let limit = Self::limit_for(is_authenticated);

        let Some(store) = &self.store else {
            let used = self.cache.record(identifier, increment);
            return Self::update_for(used, limit);
        };

        match self.incremented_count(store.as_ref(), identifier, increment).await {
            Ok(used) => Self::update_for(used, limit),
            Err(e) => {
                warn!("usage store update failed, using memory cache: {e:#}");
                let used = self.cache.record(identifier, increment);
                Self::update_for(used, limit)
            }
        }
    }

    /// Read-only usage view; falls back like [`check`](Self::check).
    pub async fn usage(&self, identifier: &str, is_authenticated: bool) -> UsageSummary {
        let status = self.check(identifier, is_authenticated).await;
        UsageSummary {
            used: status.used,
            limit: status.limit,
            remaining_calls: status.remaining_calls,
        }
    }

    /// Effective counter from the store, applying (and persisting) the lazy
    /// window reset when `now - last_reset` exceeds the reset period.
    async fn current_count(&self, store: &dyn UsageStore, identifier: &str) -> Result<u32> {
        match store.fetch(identifier).await? {
            Some(record) if !self.window_expired(&record) => Ok(record.call_count),
            _ => {
                let reset = UsageRecord {
                    identifier: identifier.to_string(),
                    call_count: 0,
                    last_reset: Utc::now(),
                };
                store.upsert(&reset).await?;
                Ok(0)
            }
        }
    }

    async fn incremented_count(
        &self,
        store: &dyn UsageStore,
        identifier: &str,
        increment: u32,
    ) -> Result<u32> {
        let updated = match store.fetch(identifier).await? {
            Some(record) if !self.window_expired(&record) => UsageRecord {
                identifier: identifier.to_string(),
                // Saturate: `increment` can be client-supplied
                call_count: record.call_count.saturating_add(increment),
                last_reset: record.last_reset,
            },
            _ => UsageRecord {
                identifier: identifier.to_string(),
                call_count: increment,
                last_reset: Utc::now(),
            },
        };

        store.upsert(&updated).await?;
        Ok(updated.call_count)
    }

    fn window_expired(&self, record: &UsageRecord) -> bool {
        Utc::now() - record.last_reset > self.reset_period
    }

    fn cached_status(&self, identifier: &str, limit: u32) -> QuotaStatus {
        Self::status_for(self.cache.used(identifier), limit)
    }

    fn status_for(used: u32, limit: u32) -> QuotaStatus {
        let remaining_calls = limit.saturating_sub(used);
        QuotaStatus {
            can_call: remaining_calls > 0,
            used,
            limit,
            remaining_calls,
            error: (remaining_calls == 0).then(|| LIMIT_REACHED_MESSAGE.to_string()),
        }
    }

    fn update_for(used: u32, limit: u32) -> QuotaUpdate {
        QuotaUpdate {
            used,
            limit,
            remaining_calls: limit.saturating_sub(used),
        }
    }
}
