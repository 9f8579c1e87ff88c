// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON error body returned by every handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_calls: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_login: Option<bool>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    Unauthorized(String),
    QuotaExceeded { requires_login: bool },
    ProviderFailure(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            ApiError::InvalidRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::ProviderFailure(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::InternalError(msg) => ErrorResponse {
                error: msg.clone(),
                remaining_calls: None,
                requires_login: None,
            },
            ApiError::QuotaExceeded { requires_login } => ErrorResponse {
                error: if *requires_login {
                    "Free API call limit reached. Sign in for a higher limit.".to_string()
                } else {
                    "API call limit reached, try again later.".to_string()
                },
                remaining_calls: Some(0),
                requires_login: requires_login.then_some(true),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ProviderFailure(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::QuotaExceeded { .. } => write!(f, "API call limit exceeded"),
            ApiError::ProviderFailure(msg) => write!(f, "Provider failure: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
