// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch rendering: stored credentials in, SVG file out.
//!
//! Used by CI jobs that cannot run the OAuth redirect. The token is never
//! refreshed here; an expired token means `auth` has to be run again.

use anyhow::{bail, Context};
use std::path::PathBuf;

use crate::config::profile_link;
use crate::models::Credentials;
use crate::services::{http_client, Badge, BadgeRenderer, ImageFetcher, TraktClient};

/// Redirect URI for clients that never receive a browser redirect.
pub const OUT_OF_BAND_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Inputs of a batch render, as read from flags or the environment.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub username: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Serialized [`Credentials`] JSON
    pub credentials: Option<String>,
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub output: PathBuf,
}

/// Return the trimmed value, or fail naming the missing variable.
pub fn require(value: Option<String>, name: &str) -> anyhow::Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!("{} is not set", name),
    }
}

/// Fetch the latest watch and write the badge to `request.output`.
///
/// Fails before any request when an input is missing or the stored token
/// has already expired, and fails on history errors instead of rendering
/// them into the badge.
pub async fn render_to_file(request: RenderRequest) -> anyhow::Result<Badge> {
    let username = require(request.username, "TRAKT_USERNAME")?;
    let client_id = require(request.client_id, "TRAKT_CLIENT_ID")?;
    let client_secret = require(request.client_secret, "TRAKT_CLIENT_SECRET")?;
    let raw_creds = require(request.credentials, "TRAKT_CREDENTIALS")?;

    let creds: Credentials =
        serde_json::from_str(&raw_creds).context("TRAKT_CREDENTIALS is not valid JSON")?;

    if creds.needs_refresh(chrono::Utc::now(), chrono::Duration::zero()) {
        bail!(
            "Stored Trakt token expired at {}; run `trakt-badge-batch auth` again",
            creds.expires_at()
        );
    }

    let http = http_client(request.timeout_secs);
    let client = TraktClient::new(
        http.clone(),
        &request.api_base_url,
        client_id,
        client_secret,
        OUT_OF_BAND_REDIRECT.to_string(),
    );

    let item = client
        .fetch_latest(&username, &creds.access_token)
        .await
        .context("Error fetching data")?;

    let badge = BadgeRenderer::new(ImageFetcher::new(http))
        .render(item.as_ref(), &profile_link(&username))
        .await;

    tokio::fs::write(&request.output, &badge.svg)
        .await
        .with_context(|| format!("Failed to write {}", request.output.display()))?;

    tracing::info!(
        path = %request.output.display(),
        height = badge.height,
        "Badge written"
    );
    Ok(badge)
}
