// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process fallback cache for usage counters
//!
//! Holds a non-authoritative shadow of the usage table for the lifetime of
//! this process. It is consulted only when the persistent store errors and
//! is never reconciled with it afterwards.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    count: u32,
    last_reset: DateTime<Utc>,
}

/// Process-local usage cache with the same lazy 24-hour reset as the store.
///
/// Constructed once per process and injected into the quota service; state
/// does not survive restarts and is not shared across instances.
pub struct MemoryUsageCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    reset_period: Duration,
}

impl MemoryUsageCache {
    pub fn new() -> Self {
        Self::with_reset_period(Duration::hours(24))
    }

    /// Custom reset period, for tests.
    pub fn with_reset_period(reset_period: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reset_period,
        }
    }

    /// Current counter for an identifier, resetting an expired window first.
    pub fn used(&self, identifier: &str) -> u32 {
        let mut entries = self.entries.write().unwrap();
        let entry = Self::entry_for(&mut entries, identifier, self.reset_period);
        entry.count
    }

    /// Add `increment` to the identifier's counter and return the new count.
    pub fn record(&self, identifier: &str, increment: u32) -> u32 {
        let mut entries = self.entries.write().unwrap();
        let entry = Self::entry_for(&mut entries, identifier, self.reset_period);
        entry.count = entry.count.saturating_add(increment);
        entry.count
    }

    fn entry_for<'a>(
        entries: &'a mut HashMap<String, CacheEntry>,
        identifier: &str,
        reset_period: Duration,
    ) -> &'a mut CacheEntry {
        let now = Utc::now();
        let entry = entries
            .entry(identifier.to_string())
            .or_insert(CacheEntry {
                count: 0,
                last_reset: now,
            });

        if now - entry.last_reset > reset_period {
            entry.count = 0;
            entry.last_reset = now;
        }

        entry
    }
}

impl Default for MemoryUsageCache {
    fn default() -> Self {
        Self::new()
    }
}
