// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation response type

use serde::{Deserialize, Serialize};

use crate::provider::GenerationStatus;

/// Response for a successfully submitted generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Provider-assigned id used to query status later
    pub request_id: String,
    pub status: GenerationStatus,
    /// Calls left in the caller's current window, after this one
    pub remaining_calls: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
}
