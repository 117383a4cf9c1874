// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Built once at startup and shared through `AppState`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default Trakt API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.trakt.tv";

/// Default refresh margin before token expiry (5 minutes).
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Largest accepted refresh margin (one day).
pub const MAX_REFRESH_MARGIN_SECS: i64 = 24 * 60 * 60;

/// Default timeout for outbound HTTP requests.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Which backend holds the deployment-wide credentials.
///
/// The per-request session cookie store is always available; this only
/// selects the store behind `/api/trakt/public` and `/api/refresh-token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// No shared store; only session-backed routes work.
    None,
    /// Upstash/Vercel-KV compatible REST store.
    Kv,
    /// JSON file on local disk.
    File,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "session" => Ok(Self::None),
            "kv" | "redis" => Ok(Self::Kv),
            "file" => Ok(Self::File),
            other => Err(ConfigError::Invalid("TRAKT_TOKEN_STORE", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trakt username whose history is shown ("me" for the token owner)
    pub trakt_username: String,
    /// Trakt OAuth client ID (public, also sent as `trakt-api-key`)
    pub trakt_client_id: String,
    /// Trakt OAuth client secret
    pub trakt_client_secret: String,
    /// OAuth redirect URI registered with Trakt
    pub trakt_redirect_uri: String,
    /// Trakt API base URL
    pub api_base_url: String,
    /// Key used to sign session cookies and OAuth state (raw bytes)
    pub session_secret: Vec<u8>,
    /// Backend for the shared credential store
    pub token_store: StoreBackend,
    /// KV REST endpoint (required when `token_store` is `Kv`)
    pub kv_rest_api_url: Option<String>,
    /// KV REST bearer token
    pub kv_rest_api_token: Option<String>,
    /// Credentials file path for the file store and device flow
    pub credentials_file: PathBuf,
    /// Seconds before expiry at which tokens are refreshed
    pub refresh_margin_secs: i64,
    /// Total timeout for outbound requests, in seconds
    pub http_timeout_secs: u64,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            trakt_username: "test_user".to_string(),
            trakt_client_id: "test_client_id".to_string(),
            trakt_client_secret: "test_secret".to_string(),
            trakt_redirect_uri: "http://localhost:8080/oauth/callback".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_secret: b"test_session_secret_32_bytes_min!".to_vec(),
            token_store: StoreBackend::None,
            kv_rest_api_url: None,
            kv_rest_api_token: None,
            credentials_file: PathBuf::from("trakt_credentials.json"),
            refresh_margin_secs: DEFAULT_REFRESH_MARGIN_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let token_store: StoreBackend = env::var("TRAKT_TOKEN_STORE")
            .unwrap_or_default()
            .parse()?;

        let kv_rest_api_url = optional("KV_REST_API_URL");
        let kv_rest_api_token = optional("KV_REST_API_TOKEN");
        if token_store == StoreBackend::Kv {
            if kv_rest_api_url.is_none() {
                return Err(ConfigError::Missing("KV_REST_API_URL"));
            }
            if kv_rest_api_token.is_none() {
                return Err(ConfigError::Missing("KV_REST_API_TOKEN"));
            }
        }

        Ok(Self {
            trakt_username: optional("TRAKT_USERNAME").unwrap_or_else(|| "me".to_string()),
            trakt_client_id: required("TRAKT_CLIENT_ID")?,
            trakt_client_secret: required("TRAKT_CLIENT_SECRET")?,
            trakt_redirect_uri: required("TRAKT_REDIRECT_URI")?,
            api_base_url: optional("TRAKT_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            session_secret: required("SESSION_SECRET")?.into_bytes(),
            token_store,
            kv_rest_api_url,
            kv_rest_api_token,
            credentials_file: optional("TRAKT_CREDENTIALS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("trakt_credentials.json")),
            refresh_margin_secs: refresh_margin()?,
            http_timeout_secs: parsed("TRAKT_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Link to the configured user's public history page.
    pub fn profile_link(&self) -> String {
        profile_link(&self.trakt_username)
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.trakt_redirect_uri.starts_with("https://")
    }
}

/// Link to `username`'s public history page on trakt.tv.
pub fn profile_link(username: &str) -> String {
    format!(
        "https://trakt.tv/users/{}/history",
        urlencoding::encode(username)
    )
}

fn refresh_margin() -> Result<i64, ConfigError> {
    const NAME: &str = "TRAKT_REFRESH_MARGIN_SECS";

    let margin = parsed(NAME, DEFAULT_REFRESH_MARGIN_SECS)?;
    if !(0..=MAX_REFRESH_MARGIN_SECS).contains(&margin) {
        return Err(ConfigError::Invalid(
            NAME,
            format!("{} (expected 0..={})", margin, MAX_REFRESH_MARGIN_SECS),
        ));
    }
    Ok(margin)
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("TRAKT_CLIENT_ID", "test_id");
        env::set_var("TRAKT_CLIENT_SECRET", "test_secret");
        env::set_var("TRAKT_REDIRECT_URI", "https://badge.example.com/oauth/callback");
        env::set_var("SESSION_SECRET", "test_session_secret_32_bytes_min!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.trakt_client_id, "test_id");
        assert_eq!(config.trakt_client_secret, "test_secret");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.refresh_margin_secs, 300);
        assert!(config.secure_cookies());

        // Margin bounds are checked in the same test to avoid env races
        for bad in ["9999999999999999", "-1", "86401"] {
            env::set_var("TRAKT_REFRESH_MARGIN_SECS", bad);
            assert!(matches!(
                Config::from_env(),
                Err(ConfigError::Invalid("TRAKT_REFRESH_MARGIN_SECS", _))
            ));
        }

        env::set_var("TRAKT_REFRESH_MARGIN_SECS", "86400");
        assert_eq!(Config::from_env().unwrap().refresh_margin_secs, 86400);
        env::remove_var("TRAKT_REFRESH_MARGIN_SECS");
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("".parse::<StoreBackend>().unwrap(), StoreBackend::None);
        assert_eq!("KV".parse::<StoreBackend>().unwrap(), StoreBackend::Kv);
        assert_eq!("file".parse::<StoreBackend>().unwrap(), StoreBackend::File);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_profile_link() {
        let config = Config::default();
        assert_eq!(
            config.profile_link(),
            "https://trakt.tv/users/test_user/history"
        );
        assert_eq!(
            profile_link("a b"),
            "https://trakt.tv/users/a%20b/history"
        );
    }
}
