// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential persistence.
//!
//! One trait, three backends:
//! - [`SessionStore`]: signed cookie on the caller's browser
//! - [`KvStore`]: external key-value store over REST
//! - [`FileStore`]: JSON file on local disk (batch/CLI mode)

pub mod file;
pub mod kv;
pub mod session;

pub use file::FileStore;
pub use kv::KvStore;
pub use session::SessionStore;

use crate::models::Credentials;
use async_trait::async_trait;

/// Key names as constants.
pub mod keys {
    /// KV key holding the serialized credentials
    pub const CREDENTIALS: &str = "trakt_credentials";
    /// Cookie carrying the signed session credentials
    pub const SESSION_COOKIE: &str = "trakt_session";
}

/// Persistent storage for the deployment's OAuth credentials.
///
/// Writes replace the whole credential set; the last writer wins.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored credentials, if any.
    async fn load(&self) -> Result<Option<Credentials>, StoreError>;

    /// Persist credentials exactly as given.
    async fn put(&self, credentials: &Credentials) -> Result<(), StoreError>;

    /// Stamp `created_at` with the server clock and persist.
    ///
    /// Returns the credentials as stored.
    async fn save(&self, credentials: Credentials) -> Result<Credentials, StoreError> {
        let stamped = credentials.stamped(chrono::Utc::now());
        self.put(&stamped).await?;
        Ok(stamped)
    }
}

/// Token store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Key-value store error: {0}")]
    Backend(String),

    #[error("Session error: {0}")]
    Session(String),
}
