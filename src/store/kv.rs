// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External key-value store speaking the Upstash/Vercel-KV REST protocol.
//!
//! - `GET  {base}/get/{key}` → `{"result": "<value>" | null}`
//! - `POST {base}/set/{key}` with the value as request body → `{"result": "OK"}`

use super::{keys, StoreError, TokenStore};
use crate::models::Credentials;
use async_trait::async_trait;
use serde::Deserialize;

/// Credentials stored as a JSON string under a single KV key.
#[derive(Clone)]
pub struct KvStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
    key: String,
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("base_url", &self.base_url)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// REST envelope returned by every command.
#[derive(Debug, Deserialize)]
struct KvResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl KvStore {
    pub fn new(http: reqwest::Client, base_url: &str, token: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            key: keys::CREDENTIALS.to_string(),
        }
    }

    /// Use a different key (several deployments sharing one database).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    async fn parse(response: reqwest::Response) -> Result<KvResponse, StoreError> {
        let status = response.status();
        let body: KvResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Backend(format!("HTTP {}: {}", status, e)))?;

        if let Some(error) = body.error {
            return Err(StoreError::Backend(format!("HTTP {}: {}", status, error)));
        }
        if !status.is_success() {
            return Err(StoreError::Backend(format!("HTTP {}", status)));
        }
        Ok(body)
    }
}

#[async_trait]
impl TokenStore for KvStore {
    async fn load(&self) -> Result<Option<Credentials>, StoreError> {
        let url = format!(
            "{}/get/{}",
            self.base_url,
            urlencoding::encode(&self.key)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match Self::parse(response).await?.result {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let url = format!(
            "{}/set/{}",
            self.base_url,
            urlencoding::encode(&self.key)
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .body(serde_json::to_string(credentials)?)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Self::parse(response).await?;
        tracing::info!(key = %self.key, "Credentials written to KV store");
        Ok(())
    }
}
