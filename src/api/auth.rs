// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bearer-token resolution against the external auth service
//!
//! The auth service itself is an external collaborator; this module only
//! asks it "whose token is this?".

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve a bearer token to a user id. `Ok(None)` means the token is
    /// not (or no longer) valid; errors mean the auth service itself was
    /// unreachable.
    async fn resolve_user(&self, bearer: &str) -> Result<Option<String>>;
}

/// Auth provider speaking the GoTrue user endpoint (Supabase).
pub struct RestAuthProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestAuthProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn resolve_user(&self, bearer: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let user: AuthUser = response.json().await?;
                Ok(Some(user.id))
            }
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(anyhow!("auth service returned {}: {}", status, text))
            }
        }
    }
}

/// Auth provider used when no auth service is configured: every caller is
/// anonymous.
pub struct NullAuthProvider;

#[async_trait]
impl AuthProvider for NullAuthProvider {
    async fn resolve_user(&self, _bearer: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
