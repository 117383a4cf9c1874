// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token lifecycle: expiry check, refresh, write-back.

use crate::config::MAX_REFRESH_MARGIN_SECS;
use crate::error::AppError;
use crate::services::trakt::TraktClient;
use crate::store::TokenStore;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

/// Decides whether stored credentials are usable and refreshes them when not.
///
/// Refreshes are serialized through a process-wide lock and the store is
/// re-read after the lock is taken, so concurrent requests against one
/// shared store trigger a single refresh. Session stores are per request:
/// two parallel requests carrying the same stale cookie each see their own
/// jar and both refresh, and since Trakt rotates refresh tokens the second
/// one fails. Separate processes sharing a store can race the same way.
#[derive(Debug)]
pub struct TokenManager {
    client: TraktClient,
    margin: Duration,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    /// `margin_secs` is clamped to `0..=MAX_REFRESH_MARGIN_SECS`.
    pub fn new(client: TraktClient, margin_secs: i64) -> Self {
        Self {
            client,
            margin: Duration::seconds(margin_secs.clamp(0, MAX_REFRESH_MARGIN_SECS)),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &TraktClient {
        &self.client
    }

    /// Return a usable access token from `store`, refreshing it if needed.
    ///
    /// Fails with `NotAuthenticated` when the store is empty and with
    /// `RefreshFailed` when Trakt rejects the refresh. A failed refresh
    /// leaves the stored credentials untouched.
    pub async fn ensure_valid(&self, store: &dyn TokenStore) -> Result<String, AppError> {
        let creds = store.load().await?.ok_or(AppError::NotAuthenticated)?;

        if !creds.needs_refresh(Utc::now(), self.margin) {
            return Ok(creds.access_token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited
        let creds = store.load().await?.ok_or(AppError::NotAuthenticated)?;
        if !creds.needs_refresh(Utc::now(), self.margin) {
            return Ok(creds.access_token);
        }

        tracing::info!(
            expires_at = %creds.expires_at(),
            "Access token expired, refreshing"
        );
        self.refresh_with(store, &creds.refresh_token).await
    }

    /// Refresh unconditionally, regardless of the stored expiry.
    pub async fn force_refresh(&self, store: &dyn TokenStore) -> Result<String, AppError> {
        let _guard = self.refresh_lock.lock().await;

        let creds = store.load().await?.ok_or(AppError::NotAuthenticated)?;
        tracing::info!("Forced token refresh requested");
        self.refresh_with(store, &creds.refresh_token).await
    }

    async fn refresh_with(
        &self,
        store: &dyn TokenStore,
        refresh_token: &str,
    ) -> Result<String, AppError> {
        let fresh = self.client.refresh_token(refresh_token).await?;
        let saved = store.save(fresh).await?;

        tracing::info!(expires_at = %saved.expires_at(), "Token refreshed and stored");
        Ok(saved.access_token)
    }
}
