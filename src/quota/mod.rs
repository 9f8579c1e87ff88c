// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! API usage quota accounting
//!
//! Tracks a call counter per identifier (user id or anonymous session id)
//! with a rolling 24-hour reset window. The authoritative record lives in a
//! relational store reached over REST; a process-local memory cache takes
//! over whenever the store is unreachable.

pub mod memory;
pub mod service;
pub mod store;

pub use memory::MemoryUsageCache;
pub use service::{QuotaService, QuotaStatus, QuotaUpdate, UsageSummary};
pub use store::{RestUsageStore, UsageRecord, UsageStore};
