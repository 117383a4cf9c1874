// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Manual token refresh against the shared store.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/refresh-token", get(refresh_token))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: String,
    pub message: String,
}

impl RefreshResponse {
    fn new(status: &str, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: status.to_string(),
            message: message.into(),
        })
    }
}

/// Force a refresh of the shared credentials.
async fn refresh_token(State(state): State<Arc<AppState>>) -> (StatusCode, Json<RefreshResponse>) {
    let Some(store) = state.shared_store.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            RefreshResponse::new("error", "No shared token store configured"),
        );
    };

    match state.token_manager.force_refresh(&**store).await {
        Ok(_) => (
            StatusCode::OK,
            RefreshResponse::new("success", "Token refreshed successfully"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Manual token refresh failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                RefreshResponse::new("error", e.to_string()),
            )
        }
    }
}
