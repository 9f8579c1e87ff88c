// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod provider;
pub mod quota;

// Re-export main types
pub use api::{ApiError, AppState, ErrorResponse};
pub use config::GatewayConfig;
pub use provider::{
    FluxClient, GatewayError, GenerationGateway, GenerationResult, GenerationStatus, PollOutcome,
    StatusPoller, StatusSource,
};
pub use quota::{
    MemoryUsageCache, QuotaService, QuotaStatus, QuotaUpdate, RestUsageStore, UsageRecord,
    UsageStore,
};
