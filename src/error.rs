// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent plain-text responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::store::StoreError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not authenticated with Trakt. Please go to /login")]
    NotAuthenticated,

    #[error("Failed to refresh Trakt token: {0}")]
    RefreshFailed(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Trakt API error: {0}")]
    TraktApi(String),

    #[error("Token store error: {0}")]
    Store(#[from] StoreError),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotAuthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::RefreshFailed(msg) => {
                tracing::error!(error = %msg, "Token refresh failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to refresh Trakt token.".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, format!("Error: {}", msg)),
            AppError::TraktApi(msg) => {
                tracing::error!(error = %msg, "Trakt API error");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Token store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Token store error".to_string(),
                )
            }
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, body).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
