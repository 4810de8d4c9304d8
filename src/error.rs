// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Expired, forged and missing session tokens all collapse into
/// [`AppError::Unauthorized`] so the client cannot tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("{0}")]
    BadRequest(String),

    #[error("Server misconfigured (missing {0})")]
    Configuration(&'static str),

    #[error("Database error: {0}")]
    Database(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            AppError::InvalidPassword => (StatusCode::UNAUTHORIZED, Some(self.to_string())),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, Some(self.to_string())),
            AppError::Configuration(_) => {
                tracing::error!(error = %self, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(self.to_string()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some("Database connection error".to_string()),
                )
            }
        };

        let body = ErrorResponse { ok: false, error };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
