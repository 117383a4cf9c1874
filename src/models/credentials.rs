// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth credentials as issued by Trakt and persisted by the token stores.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The single credential set a deployment holds.
///
/// `created_at + expires_in` is the expiry instant. Stores overwrite
/// `created_at` with the server clock on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
    /// Unix timestamp (seconds) the token was issued or saved
    #[serde(default, alias = "saved_at", deserialize_with = "unix_seconds")]
    pub created_at: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Accept integer or fractional timestamps (older clients stored floats).
fn unix_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Timestamp {
        Int(i64),
        Float(f64),
    }

    Ok(match Timestamp::deserialize(deserializer)? {
        Timestamp::Int(secs) => secs,
        Timestamp::Float(secs) => secs as i64,
    })
}

impl Credentials {
    /// Instant at which the access token stops being accepted.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.created_at.saturating_add(self.expires_in), 0)
            .unwrap_or_default()
    }

    /// True once `now` is within `margin` of expiry.
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now >= self.expires_at() - margin
    }

    /// Replace the issue time with `now`.
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        self.created_at = now.timestamp();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(created_at: i64, expires_in: i64) -> Credentials {
        Credentials {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in,
            created_at,
            token_type: "bearer".to_string(),
            scope: None,
        }
    }

    #[test]
    fn test_needs_refresh_respects_margin() {
        let now = Utc::now();
        let c = creds(now.timestamp(), 3600);
        let margin = Duration::seconds(300);

        assert!(!c.needs_refresh(now, margin));
        assert!(!c.needs_refresh(now + Duration::seconds(3299), margin));
        assert!(c.needs_refresh(now + Duration::seconds(3300), margin));
        assert!(c.needs_refresh(now + Duration::seconds(3600), Duration::zero()));
    }

    #[test]
    fn test_deserialize_trakt_token_response() {
        let json = r#"{
            "access_token": "dbaf9757982a9e738f05d249b7b5b4a266b3a139049317c4909f2f263572c781",
            "token_type": "bearer",
            "expires_in": 86400,
            "refresh_token": "76ba4c5c75c96f6087f58a4de10be6c00b29ea1ddc3b2022ee2016d1363e3a7c",
            "scope": "public",
            "created_at": 1487889741
        }"#;

        let c: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(c.expires_in, 86400);
        assert_eq!(c.created_at, 1487889741);
        assert_eq!(c.scope.as_deref(), Some("public"));
    }

    #[test]
    fn test_deserialize_float_saved_at() {
        let json = r#"{
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 7776000,
            "saved_at": 1700000000.75
        }"#;

        let c: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(c.created_at, 1700000000);
        assert_eq!(c.token_type, "bearer");
    }

    #[test]
    fn test_stamped_replaces_created_at() {
        let now = Utc::now();
        let c = creds(0, 60).stamped(now);
        assert_eq!(c.created_at, now.timestamp());
    }
}
