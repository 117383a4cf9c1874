// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trakt OAuth authorization-code routes.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::store::{SessionStore, TokenStore};
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// How long a signed OAuth state stays acceptable (10 minutes).
const STATE_MAX_AGE_MILLIS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/oauth/callback", get(oauth_callback))
}

/// Start OAuth flow - 302 to Trakt authorization.
async fn login(State(state): State<Arc<AppState>>) -> Result<Response> {
    let oauth_state = sign_state(now_millis()?, &state.config.session_secret)?;
    let auth_url = state.token_manager.client().authorize_url(&oauth_state);

    tracing::info!(
        client_id = %state.config.trakt_client_id,
        "Starting OAuth flow, redirecting to Trakt"
    );

    Ok((StatusCode::FOUND, [(header::LOCATION, auth_url)]).into_response())
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, persist them.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Html<&'static str>)> {
    // Check for OAuth errors
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Trakt");
        return Err(AppError::BadRequest(format!(
            "Trakt authorization failed: {}",
            error
        )));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No authorization code provided.".to_string()))?;

    let state_ok = params
        .state
        .as_deref()
        .map(|s| verify_state(s, &state.config.session_secret, now_millis().unwrap_or(0)))
        .unwrap_or(false);
    if !state_ok {
        tracing::error!("OAuth state missing, expired or tampered");
        return Err(AppError::BadRequest("Invalid OAuth state.".to_string()));
    }

    tracing::info!("Exchanging authorization code for tokens");

    let creds = state
        .token_manager
        .client()
        .exchange_code(&code)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Error exchanging code for token: {}", e)))?;

    let session = SessionStore::new(
        jar,
        &state.config.session_secret,
        state.config.secure_cookies(),
    );
    let saved = session.save(creds).await?;

    if let Some(shared) = &state.shared_store {
        shared.put(&saved).await?;
    }

    tracing::info!(expires_at = %saved.expires_at(), "OAuth successful, tokens stored");

    Ok((
        session.into_jar(),
        Html("Successfully authenticated with Trakt! You can now close this window."),
    ))
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Build the OAuth `state`: "timestamp_hex|signature_hex", base64url encoded.
fn sign_state(timestamp_millis: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{:x}", timestamp_millis);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed_state = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed_state.as_bytes()))
}

/// Verify the HMAC signature and age of an OAuth state parameter.
fn verify_state(state: &str, secret: &[u8], now_millis: u128) -> bool {
    let Some(state_str) = URL_SAFE_NO_PAD
        .decode(state)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return false;
    };

    let Some((timestamp_hex, signature_hex)) = state_str.split_once('|') else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(timestamp_hex.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if !bool::from(expected.as_bytes().ct_eq(signature_hex.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    match u128::from_str_radix(timestamp_hex, 16) {
        Ok(issued) => issued <= now_millis && now_millis - issued <= STATE_MAX_AGE_MILLIS,
        Err(_) => false,
    }
}
