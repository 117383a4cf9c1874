// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trakt-Badge API Server
//!
//! Serves an SVG badge of the latest Trakt watch, handling the OAuth
//! authorization-code flow and token refresh.

use std::sync::Arc;
use trakt_badge::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        token_store = ?config.token_store,
        refresh_margin_secs = config.refresh_margin_secs,
        "Starting Trakt-Badge API"
    );

    let state = Arc::new(AppState::from_config(config.clone()));
    if state.shared_store.is_none() {
        tracing::info!("No shared token store, /api/trakt/public is disabled");
    }

    // Build router
    let app = trakt_badge::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trakt_badge=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
