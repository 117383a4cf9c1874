// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers: an in-process fake Trakt API and an in-memory store.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use trakt_badge::config::Config;
use trakt_badge::models::Credentials;
use trakt_badge::store::{StoreError, TokenStore};
use trakt_badge::AppState;

/// PNG magic bytes served as the fake logo.
pub const LOGO_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Scripted behavior and call counters for the fake Trakt API.
#[derive(Default)]
pub struct FakeTrakt {
    pub token_calls: AtomicUsize,
    pub device_polls: AtomicUsize,
    pub history_calls: AtomicUsize,
    /// Status returned by `/oauth/token` (200 when unset)
    pub token_status: Mutex<Option<StatusCode>>,
    /// Statuses returned by successive device-token polls
    pub device_script: Mutex<VecDeque<u16>>,
    /// Polling interval advertised by `/oauth/device/code`
    pub device_interval: Mutex<u64>,
    /// Body of `/users/{id}/history` (empty list when unset)
    pub history: Mutex<Option<serde_json::Value>>,
    /// Status of `/users/{id}/history` (200 when unset)
    pub history_status: Mutex<Option<StatusCode>>,
    /// Headers seen on the last history request
    pub last_history_headers: Mutex<Option<HeaderMap>>,
    pub last_history_user: Mutex<Option<String>>,
}

impl FakeTrakt {
    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn device_polls(&self) -> usize {
        self.device_polls.load(Ordering::SeqCst)
    }

    pub fn fail_token_endpoint(&self, status: StatusCode) {
        *self.token_status.lock().unwrap() = Some(status);
    }

    pub fn script_device(&self, statuses: &[u16], interval: u64) {
        *self.device_script.lock().unwrap() = statuses.iter().copied().collect();
        *self.device_interval.lock().unwrap() = interval;
    }

    pub fn set_history(&self, body: serde_json::Value) {
        *self.history.lock().unwrap() = Some(body);
    }

    pub fn fail_history(&self, status: StatusCode) {
        *self.history_status.lock().unwrap() = Some(status);
    }
}

fn token_body(n: usize) -> serde_json::Value {
    serde_json::json!({
        "access_token": format!("fresh-access-{}", n),
        "token_type": "bearer",
        "expires_in": 86400,
        "refresh_token": format!("fresh-refresh-{}", n),
        "scope": "public",
        "created_at": 1_487_889_741
    })
}

async fn oauth_token(
    State(fake): State<Arc<FakeTrakt>>,
    Json(_body): Json<serde_json::Value>,
) -> Response {
    let n = fake.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some(status) = *fake.token_status.lock().unwrap() {
        return (status, Json(serde_json::json!({ "error": "invalid_grant" }))).into_response();
    }
    Json(token_body(n)).into_response()
}

async fn device_code(State(fake): State<Arc<FakeTrakt>>) -> Json<serde_json::Value> {
    let interval = *fake.device_interval.lock().unwrap();
    Json(serde_json::json!({
        "device_code": "device-123",
        "user_code": "ABCD1234",
        "verification_url": "https://trakt.tv/activate",
        "expires_in": 600,
        "interval": interval
    }))
}

async fn device_token(State(fake): State<Arc<FakeTrakt>>) -> Response {
    let n = fake.device_polls.fetch_add(1, Ordering::SeqCst) + 1;
    let status = fake.device_script.lock().unwrap().pop_front().unwrap_or(200);
    match status {
        200 => Json(token_body(n)).into_response(),
        other => StatusCode::from_u16(other)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
    }
}

async fn history(
    State(fake): State<Arc<FakeTrakt>>,
    Path(user): Path<String>,
    headers: HeaderMap,
) -> Response {
    fake.history_calls.fetch_add(1, Ordering::SeqCst);
    *fake.last_history_headers.lock().unwrap() = Some(headers);
    *fake.last_history_user.lock().unwrap() = Some(user);

    if let Some(status) = *fake.history_status.lock().unwrap() {
        return (status, "upstream exploded").into_response();
    }
    let body = fake
        .history
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| serde_json::json!([]));
    Json(body).into_response()
}

async fn logo() -> Response {
    ([(header::CONTENT_TYPE, "image/png")], LOGO_BYTES).into_response()
}

/// Serve the fake API on an ephemeral port; returns it and its base URL.
pub async fn spawn_fake_trakt() -> (Arc<FakeTrakt>, String) {
    let fake = Arc::new(FakeTrakt::default());

    let app = Router::new()
        .route("/oauth/token", post(oauth_token))
        .route("/oauth/device/code", post(device_code))
        .route("/oauth/device/token", post(device_token))
        .route("/users/{user}/history", get(history))
        .route("/logo.png", get(logo))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake Trakt");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, format!("http://{}", addr))
}

/// Config pointed at the fake API.
pub fn test_config(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        http_timeout_secs: 5,
        ..Config::default()
    }
}

/// App state pointed at the fake API.
pub fn test_state(base_url: &str) -> AppState {
    AppState::from_config(test_config(base_url))
}

/// Credentials issued `age_secs` ago with the given lifetime.
pub fn creds_issued(age_secs: i64, expires_in: i64) -> Credentials {
    Credentials {
        access_token: "stored-access".to_string(),
        refresh_token: "stored-refresh".to_string(),
        expires_in,
        created_at: chrono::Utc::now().timestamp() - age_secs,
        token_type: "bearer".to_string(),
        scope: None,
    }
}

/// In-memory store that counts writes.
#[derive(Default)]
pub struct MemoryStore {
    pub creds: Mutex<Option<Credentials>>,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with(creds: Credentials) -> Self {
        Self {
            creds: Mutex::new(Some(creds)),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn current(&self) -> Option<Credentials> {
        self.creds.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn load(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.creds.lock().unwrap().clone())
    }

    async fn put(&self, credentials: &Credentials) -> Result<(), StoreError> {
        *self.creds.lock().unwrap() = Some(credentials.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
