// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for the in-process usage cache

use chrono::Duration;
use kontext_gateway::quota::MemoryUsageCache;

#[test]
fn fresh_identifier_starts_at_zero() {
    let cache = MemoryUsageCache::new();
    assert_eq!(cache.used("session-1"), 0);
}

#[test]
fn record_accumulates_counts() {
    let cache = MemoryUsageCache::new();
    assert_eq!(cache.record("session-1", 1), 1);
    assert_eq!(cache.record("session-1", 1), 2);
    assert_eq!(cache.record("session-1", 3), 5);
    assert_eq!(cache.used("session-1"), 5);
}

#[test]
fn identifiers_are_independent() {
    let cache = MemoryUsageCache::new();
    cache.record("session-a", 4);
    assert_eq!(cache.used("session-a"), 4);
    assert_eq!(cache.used("session-b"), 0);
}

#[test]
fn reading_does_not_change_the_count() {
    let cache = MemoryUsageCache::new();
    cache.record("session-1", 2);
    assert_eq!(cache.used("session-1"), 2);
    assert_eq!(cache.used("session-1"), 2);
}

#[test]
fn record_saturates_at_the_counter_maximum() {
    let cache = MemoryUsageCache::new();
    cache.record("session-1", u32::MAX);
    assert_eq!(cache.record("session-1", 1), u32::MAX);
    assert_eq!(cache.used("session-1"), u32::MAX);
}

#[test]
fn counter_resets_after_the_window_expires() {
    // Shrink the window so the test does not wait 24 hours
    let cache = MemoryUsageCache::with_reset_period(Duration::milliseconds(50));
    cache.record("session-1", 7);
    assert_eq!(cache.used("session-1"), 7);

    std::thread::sleep(std::time::Duration::from_millis(80));

    assert_eq!(cache.used("session-1"), 0);
    assert_eq!(cache.record("session-1", 1), 1);
}

#[test]
fn expired_window_resets_before_recording() {
    let cache = MemoryUsageCache::with_reset_period(Duration::milliseconds(50));
    cache.record("session-1", 9);

    std::thread::sleep(std::time::Duration::from_millis(80));

    // The increment lands on a fresh window, not on top of the stale count
    assert_eq!(cache.record("session-1", 1), 1);
}
