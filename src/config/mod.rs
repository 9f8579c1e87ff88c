// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-driven gateway configuration

use std::env;

/// Credentials read from the environment at startup.
///
/// Missing values are not fatal: the gateway starts with the affected
/// feature disabled (generation answers 503, quota accounting runs
/// memory-only).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// fal.ai API key; `None` disables the generation endpoints
    pub fal_key: Option<String>,
    /// Base URL of the Supabase project hosting the `api_usage` table
    pub supabase_url: Option<String>,
    /// Anon key for the store's REST interface and auth endpoint
    pub supabase_anon_key: Option<String>,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            fal_key: non_empty(env::var("FAL_KEY").ok()),
            supabase_url: non_empty(env::var("SUPABASE_URL").ok()),
            supabase_anon_key: non_empty(env::var("SUPABASE_ANON_KEY").ok()),
        }
    }

    /// True when both store credentials are present.
    pub fn store_configured(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
