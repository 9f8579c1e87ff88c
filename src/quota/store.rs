// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persistent usage store reached over the relational store's REST interface

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One usage row per identifier, mirroring the `api_usage` table:
/// `api_usage(identifier TEXT PRIMARY KEY, call_count INTEGER, last_reset TIMESTAMPTZ)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub identifier: String,
    pub call_count: u32,
    pub last_reset: DateTime<Utc>,
}

/// Persistence seam for usage records. The quota service treats any error
/// as "store unreachable" and falls back to its memory cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Fetch the record for an identifier, `None` for a never-seen one.
    async fn fetch(&self, identifier: &str) -> Result<Option<UsageRecord>>;

    /// Insert or replace the record for `record.identifier`.
    async fn upsert(&self, record: &UsageRecord) -> Result<()>;
}

/// `UsageStore` backed by a PostgREST-style endpoint (Supabase).
pub struct RestUsageStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestUsageStore {
    /// Requests are bounded by a 10-second client timeout so a quota check
    /// never blocks a handler longer than that.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/api_usage", self.base_url)
    }
}

#[async_trait]
impl UsageStore for RestUsageStore {
    async fn fetch(&self, identifier: &str) -> Result<Option<UsageRecord>> {
        let url = self.table_url();
        debug!("usage store fetch GET {} identifier={}", url, identifier);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("identifier", format!("eq.{}", identifier)),
                ("select", "identifier,call_count,last_reset".to_string()),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("usage store returned {}: {}", status, text));
        }

        let rows: Vec<UsageRecord> = response.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert(&self, record: &UsageRecord) -> Result<()> {
        let url = self.table_url();
        debug!(
            "usage store upsert POST {} identifier={} call_count={}",
            url, record.identifier, record.call_count
        );

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("usage store returned {}: {}", status, text));
        }

        Ok(())
    }
}
