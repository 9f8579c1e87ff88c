// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation API endpoint module
//!
//! Provides POST /api/flux/generate for reference-image-guided generation.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::generate_image_handler;
pub use request::{GenerateRequest, MAX_PROMPT_CHARS};
pub use response::GenerateResponse;
