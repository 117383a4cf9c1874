// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trakt-Badge: an embeddable SVG of your latest Trakt watch
//!
//! This crate provides the HTTP service and batch tooling that authorize
//! against Trakt, keep the OAuth token fresh, and render the most recent
//! history entry as a badge.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use config::{Config, StoreBackend};
use services::{BadgeRenderer, ImageFetcher, TokenManager, TraktClient};
use std::sync::Arc;
use store::{FileStore, KvStore, TokenStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub token_manager: TokenManager,
    pub renderer: BadgeRenderer<ImageFetcher>,
    /// Deployment-wide credential store, if one is configured
    pub shared_store: Option<Arc<dyn TokenStore>>,
}

impl AppState {
    /// Wire every component from configuration.
    pub fn from_config(config: Config) -> Self {
        let http = services::http_client(config.http_timeout_secs);

        let shared_store: Option<Arc<dyn TokenStore>> = match config.token_store {
            StoreBackend::None => None,
            StoreBackend::Kv => match (&config.kv_rest_api_url, &config.kv_rest_api_token) {
                (Some(url), Some(token)) => {
                    Some(Arc::new(KvStore::new(http.clone(), url, token.clone())))
                }
                _ => {
                    tracing::warn!("KV store selected without URL and token, disabling");
                    None
                }
            },
            StoreBackend::File => Some(Arc::new(FileStore::new(config.credentials_file.clone()))),
        };

        let client = TraktClient::from_config(http.clone(), &config);
        let token_manager = TokenManager::new(client, config.refresh_margin_secs);
        let renderer = BadgeRenderer::new(ImageFetcher::new(http));

        Self {
            config,
            token_manager,
            renderer,
            shared_store,
        }
    }

    /// Replace the shared store (tests and embedders).
    pub fn with_shared_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.shared_store = Some(store);
        self
    }
}
