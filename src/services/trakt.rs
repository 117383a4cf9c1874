// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trakt API client.
//!
//! Handles:
//! - Authorization-code exchange and token refresh
//! - Device-code issue and polling
//! - Fetching the latest watch history entry

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Credentials, WatchedItem, WatchedKind};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Trakt API version sent with every request.
const TRAKT_API_VERSION: &str = "2";

/// Connect timeout for all outbound requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the shared HTTP client with explicit timeouts.
pub fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("trakt-badge/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Trakt API client.
#[derive(Clone)]
pub struct TraktClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl std::fmt::Debug for TraktClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraktClient")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl TraktClient {
    /// Create a new Trakt client with OAuth credentials.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Create a client from application config.
    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http,
            &config.api_base_url,
            config.trakt_client_id.clone(),
            config.trakt_client_secret.clone(),
            config.trakt_redirect_uri.clone(),
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    // ─── OAuth ───────────────────────────────────────────────────────────────

    /// URL the user is sent to for authorization-code consent.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/oauth/authorize?\
             response_type=code&\
             client_id={}&\
             redirect_uri={}&\
             state={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for credentials.
    pub async fn exchange_code(&self, code: &str) -> Result<Credentials, AppError> {
        let body = serde_json::json!({
            "code": code,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "redirect_uri": self.redirect_uri,
            "grant_type": "authorization_code",
        });

        let response = self
            .http
            .post(format!("{}/oauth/token", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::TraktApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Trakt token exchange failed");
            return Err(AppError::TraktApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::TraktApi(format!("Failed to parse token response: {}", e)))
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Credentials, AppError> {
        let body = serde_json::json!({
            "refresh_token": refresh_token,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "redirect_uri": self.redirect_uri,
            "grant_type": "refresh_token",
        });

        let response = self
            .http
            .post(format!("{}/oauth/token", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::RefreshFailed(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RefreshFailed(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::RefreshFailed(format!("JSON parse error: {}", e)))
    }

    /// Start the device flow.
    pub async fn request_device_code(&self) -> Result<DeviceCode, AppError> {
        let response = self
            .http
            .post(format!("{}/oauth/device/code", self.base_url))
            .json(&serde_json::json!({ "client_id": self.client_id }))
            .send()
            .await
            .map_err(|e| AppError::TraktApi(format!("Device code request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Poll once for the device-flow token.
    ///
    /// 200 means authorized, 400 means the user has not acted yet, and any
    /// other status ends the flow.
    pub async fn poll_device_token(&self, device_code: &str) -> Result<DevicePoll, AppError> {
        let body = serde_json::json!({
            "code": device_code,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
        });

        let response = self
            .http
            .post(format!("{}/oauth/device/token", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::TraktApi(format!("Device token poll failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => {
                let creds = response
                    .json()
                    .await
                    .map_err(|e| AppError::TraktApi(format!("JSON parse error: {}", e)))?;
                Ok(DevicePoll::Authorized(creds))
            }
            StatusCode::BAD_REQUEST => Ok(DevicePoll::Pending),
            status => Ok(DevicePoll::Rejected(status)),
        }
    }

    // ─── History ─────────────────────────────────────────────────────────────

    /// Fetch the most recent history entry for `user` ("me" for the token owner).
    ///
    /// An empty history is `Ok(None)`.
    pub async fn fetch_latest(
        &self,
        user: &str,
        access_token: &str,
    ) -> Result<Option<WatchedItem>, AppError> {
        let user = if user.is_empty() { "me" } else { user };
        let url = format!(
            "{}/users/{}/history",
            self.base_url,
            urlencoding::encode(user)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header("trakt-api-version", TRAKT_API_VERSION)
            .header("trakt-api-key", &self.client_id)
            .query(&[("limit", "1"), ("extended", "full,images")])
            .send()
            .await
            .map_err(|e| AppError::TraktApi(e.to_string()))?;

        let history: Vec<HistoryEntry> = self.check_response_json(response).await?;

        history
            .into_iter()
            .next()
            .map(HistoryEntry::into_watched_item)
            .transpose()
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Trakt rate limit hit (429)");
            }

            return Err(AppError::TraktApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::TraktApi(format!("JSON parse error: {}", e)))
    }
}

/// Device code response from Trakt.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    /// Seconds until the device code expires
    pub expires_in: u64,
    /// Seconds to wait between polls
    pub interval: u64,
}

/// Outcome of a single device-token poll.
#[derive(Debug, Clone)]
pub enum DevicePoll {
    Authorized(Credentials),
    Pending,
    Rejected(StatusCode),
}

// ─── History payload ─────────────────────────────────────────────────────────

/// One entry of `/users/{id}/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub movie: Option<TraktMedia>,
    pub show: Option<TraktMedia>,
    pub episode: Option<TraktEpisode>,
}

/// Movie or show details (`extended=full,images`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraktMedia {
    pub title: String,
    pub year: Option<i32>,
    pub tagline: Option<String>,
    pub genres: Vec<String>,
    pub images: TraktImages,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraktImages {
    pub logo: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraktEpisode {
    pub season: u32,
    pub number: u32,
    pub title: Option<String>,
}

impl HistoryEntry {
    /// Normalize into the record the badge renders.
    pub fn into_watched_item(self) -> Result<WatchedItem, AppError> {
        match self.kind.as_str() {
            "movie" => {
                let movie = self.movie.unwrap_or_default();
                Ok(WatchedItem {
                    kind: WatchedKind::Movie,
                    title: movie.title,
                    year: movie.year,
                    season: None,
                    episode_number: None,
                    tagline: movie.tagline.filter(|t| !t.is_empty()),
                    genres: movie.genres,
                    logo_url: movie.images.logo.into_iter().next(),
                })
            }
            "episode" => {
                let show = self.show.unwrap_or_default();
                let episode = self.episode.unwrap_or_default();
                Ok(WatchedItem {
                    kind: WatchedKind::Episode,
                    title: show.title,
                    year: show.year,
                    season: Some(episode.season),
                    episode_number: Some(episode.number),
                    tagline: None,
                    genres: show.genres,
                    logo_url: show.images.logo.into_iter().next(),
                })
            }
            other => Err(AppError::TraktApi(format!(
                "Unrecognized history entry type: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_entry_normalized() {
        let json = r#"{
            "id": 1982346,
            "watched_at": "2024-03-10T21:15:00.000Z",
            "action": "watch",
            "type": "movie",
            "movie": {
                "title": "The Matrix",
                "year": 1999,
                "tagline": "Welcome to the Real World.",
                "genres": ["science-fiction", "action"],
                "images": { "logo": ["walter-r2.trakt.tv/images/movies/000/000/481/logos/medium/1.png.webp"] }
            }
        }"#;

        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        let item = entry.into_watched_item().unwrap();

        assert_eq!(item.kind, WatchedKind::Movie);
        assert_eq!(item.title, "The Matrix");
        assert_eq!(item.year, Some(1999));
        assert_eq!(item.tagline.as_deref(), Some("Welcome to the Real World."));
        assert_eq!(item.genres, vec!["science-fiction", "action"]);
        assert!(item.logo_url.unwrap().starts_with("walter-r2.trakt.tv/"));
    }

    #[test]
    fn test_episode_entry_uses_show_fields() {
        let json = r#"{
            "type": "episode",
            "episode": { "season": 2, "number": 7, "title": "Pilot" },
            "show": { "title": "Severance", "year": 2022, "genres": ["drama"] }
        }"#;

        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        let item = entry.into_watched_item().unwrap();

        assert_eq!(item.kind, WatchedKind::Episode);
        assert_eq!(item.title, "Severance");
        assert_eq!(item.season, Some(2));
        assert_eq!(item.episode_number, Some(7));
        assert_eq!(item.tagline, None);
        assert_eq!(item.logo_url, None);
    }

    #[test]
    fn test_empty_tagline_dropped() {
        let json = r#"{ "type": "movie", "movie": { "title": "X", "tagline": "" } }"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.into_watched_item().unwrap().tagline, None);
    }

    #[test]
    fn test_unknown_entry_type_is_error() {
        let json = r#"{ "type": "season" }"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert!(matches!(
            entry.into_watched_item(),
            Err(AppError::TraktApi(_))
        ));
    }

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let client = TraktClient::new(
            reqwest::Client::new(),
            "https://api.trakt.tv/",
            "cid".to_string(),
            "secret".to_string(),
            "https://badge.example.com/oauth/callback".to_string(),
        );

        let url = client.authorize_url("abc");
        assert_eq!(
            url,
            "https://api.trakt.tv/oauth/authorize?response_type=code&client_id=cid\
             &redirect_uri=https%3A%2F%2Fbadge.example.com%2Foauth%2Fcallback&state=abc"
        );
    }
}
