// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod auth;
pub mod errors;
pub mod generate;
pub mod http_server;
pub mod session;
pub mod status;
pub mod usage;

pub use auth::{AuthProvider, NullAuthProvider, RestAuthProvider};
pub use errors::{ApiError, ErrorResponse};
pub use generate::{generate_image_handler, GenerateRequest, GenerateResponse};
pub use http_server::{build_router, start_server, AppState};
pub use session::{authenticated_user, resolve_identity, Identity, SESSION_COOKIE};
pub use status::{generation_status_handler, is_valid_request_id};
pub use usage::{
    update_usage_handler, usage_handler, UpdateUsageRequest, UpdateUsageResponse, UsageResponse,
};
