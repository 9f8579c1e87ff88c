// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hand-rolled store fakes shared by the quota tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use kontext_gateway::quota::{UsageRecord, UsageStore};
use std::collections::HashMap;
use std::sync::Mutex;

/// Store backed by a plain map, recording every upsert.
#[derive(Default)]
pub struct FakeStore {
    pub records: Mutex<HashMap<String, UsageRecord>>,
}

impl FakeStore {
    pub fn with_record(record: UsageRecord) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .unwrap()
            .insert(record.identifier.clone(), record);
        store
    }

    pub fn record_for(&self, identifier: &str) -> Option<UsageRecord> {
        self.records.lock().unwrap().get(identifier).cloned()
    }
}

#[async_trait]
impl UsageStore for FakeStore {
    async fn fetch(&self, identifier: &str) -> Result<Option<UsageRecord>> {
        Ok(self.records.lock().unwrap().get(identifier).cloned())
    }

    async fn upsert(&self, record: &UsageRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert(record.identifier.clone(), record.clone());
        Ok(())
    }
}

/// Store whose every operation fails, to exercise the memory fallback.
pub struct FailingStore;

#[async_trait]
impl UsageStore for FailingStore {
    async fn fetch(&self, _identifier: &str) -> Result<Option<UsageRecord>> {
        Err(anyhow!("store unreachable"))
    }

    async fn upsert(&self, _record: &UsageRecord) -> Result<()> {
        Err(anyhow!("store unreachable"))
    }
}
