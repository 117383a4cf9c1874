// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-cookie store.
//!
//! Credentials ride in an HttpOnly cookie holding an HS256 JWT signed with
//! the session secret. A store wraps one request's cookie jar; handlers
//! return [`SessionStore::into_jar`] with the response so updates reach the
//! browser.

use super::{keys, StoreError, TokenStore};
use crate::models::Credentials;
use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Session lifetime (30 days).
const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Stored Trakt credentials
    pub creds: Credentials,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Per-request store backed by the caller's cookie jar.
pub struct SessionStore {
    jar: Mutex<CookieJar>,
    modified: AtomicBool,
    signing_key: Vec<u8>,
    secure: bool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(jar: CookieJar, signing_key: &[u8], secure: bool) -> Self {
        Self {
            jar: Mutex::new(jar),
            modified: AtomicBool::new(false),
            signing_key: signing_key.to_vec(),
            secure,
        }
    }

    /// True once `put` has written a new session cookie.
    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::SeqCst)
    }

    /// Give back the jar, including any cookie written by `save`.
    pub fn into_jar(self) -> CookieJar {
        self.jar
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CookieJar>, StoreError> {
        self.jar
            .lock()
            .map_err(|_| StoreError::Session("cookie jar lock poisoned".to_string()))
    }
}

/// Encode credentials as a signed session token.
pub fn create_session_token(creds: &Credentials, signing_key: &[u8]) -> anyhow::Result<String> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = SessionClaims {
        creds: creds.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session token and extract its credentials.
pub fn decode_session_token(token: &str, signing_key: &[u8]) -> Option<Credentials> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    match decode::<SessionClaims>(token, &key, &validation) {
        Ok(data) => Some(data.claims.creds),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session cookie");
            None
        }
    }
}

#[async_trait]
impl TokenStore for SessionStore {
    async fn load(&self) -> Result<Option<Credentials>, StoreError> {
        let jar = self.lock()?;
        Ok(jar
            .get(keys::SESSION_COOKIE)
            .and_then(|cookie| decode_session_token(cookie.value(), &self.signing_key)))
    }

    async fn put(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let token = create_session_token(credentials, &self.signing_key)
            .map_err(|e| StoreError::Session(e.to_string()))?;

        let cookie = Cookie::build((keys::SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64));

        let mut jar = self.lock()?;
        *jar = jar.clone().add(cookie);
        self.modified.store(true, Ordering::SeqCst);
        Ok(())
    }
}
