// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation request type and validation

use serde::{Deserialize, Serialize};

/// Maximum prompt length after trimming
pub const MAX_PROMPT_CHARS: usize = 500;

/// Request for POST /api/flux/generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Text prompt describing the desired edit
    #[serde(default)]
    pub prompt: String,

    /// Reference images: data URIs, http(s) URLs, or raw base64
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl GenerateRequest {
    /// Validate before any collaborator is called. `allow_empty_images` is
    /// true only when the gateway runs in demo mode and substitutes
    /// placeholder references itself.
    pub fn validate(&self, allow_empty_images: bool) -> Result<(), String> {
        let trimmed = self.prompt.trim();
        if trimmed.is_empty() {
            return Err("prompt must not be empty".to_string());
        }
        if trimmed.chars().count() > MAX_PROMPT_CHARS {
            return Err(format!(
                "prompt must be at most {} characters",
                MAX_PROMPT_CHARS
            ));
        }

        if self.image_urls.is_empty() && !allow_empty_images {
            return Err("at least one image URL is required".to_string());
        }
        if self.image_urls.iter().any(|url| url.trim().is_empty()) {
            return Err("image URLs must not be empty".to_string());
        }

        Ok(())
    }
}
