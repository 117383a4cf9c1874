// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logo download and data-URI encoding.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Fallback MIME type when the server sends no `Content-Type`.
const DEFAULT_MIME: &str = "image/png";

/// Resolves a logo reference into something embeddable in the badge.
#[async_trait]
pub trait LogoSource: Send + Sync {
    /// Return a `data:` URI for `reference`, or an empty string on failure.
    async fn to_data_uri(&self, reference: &str) -> String;
}

/// Downloads logos over HTTP.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.http.get(url).send().await?.error_for_status()?;

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_MIME)
            .to_string();

        let bytes = response.bytes().await?;
        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)))
    }
}

#[async_trait]
impl LogoSource for ImageFetcher {
    async fn to_data_uri(&self, reference: &str) -> String {
        if reference.trim().is_empty() {
            return String::new();
        }

        let url = absolute_url(reference);
        match self.fetch(&url).await {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Logo download failed, rendering without it");
                String::new()
            }
        }
    }
}

/// Prefix `https://` onto references that carry no scheme.
pub fn absolute_url(reference: &str) -> String {
    let reference = reference.trim();
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        reference
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        reference.to_string()
    } else {
        format!("https://{}", reference.trim_start_matches('/'))
    }
}
