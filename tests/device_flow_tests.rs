// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device flow polling tests.

use std::time::{Duration, Instant};
use trakt_badge::services::device::poll_for_token;
use trakt_badge::services::{http_client, run_device_flow, DeviceFlowError, TraktClient};
use trakt_badge::store::{FileStore, TokenStore};

mod common;
use common::spawn_fake_trakt;

fn client(base_url: &str) -> TraktClient {
    TraktClient::new(
        http_client(5),
        base_url,
        "cid".to_string(),
        "secret".to_string(),
        "urn:ietf:wg:oauth:2.0:oob".to_string(),
    )
}

#[tokio::test]
async fn test_pending_polls_then_success() {
    let (fake, base_url) = spawn_fake_trakt().await;
    fake.script_device(&[400, 400, 200], 1);
    let client = client(&base_url);

    let code = client.request_device_code().await.unwrap();
    assert_eq!(code.user_code, "ABCD1234");
    assert_eq!(code.interval, 1);

    let started = Instant::now();
    let creds = poll_for_token(&client, &code).await.unwrap();

    assert_eq!(fake.device_polls(), 3);
    assert_eq!(creds.access_token, "fresh-access-3");
    // One interval before each of the three polls
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn test_forbidden_terminates_immediately() {
    let (fake, base_url) = spawn_fake_trakt().await;
    fake.script_device(&[400, 403, 200], 1);
    let client = client(&base_url);

    let code = client.request_device_code().await.unwrap();
    let result = poll_for_token(&client, &code).await;

    match result {
        Err(DeviceFlowError::Rejected(status)) => assert_eq!(status.as_u16(), 403),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(fake.device_polls(), 2);
}

#[tokio::test]
async fn test_device_flow_writes_credentials_file() {
    let (fake, base_url) = spawn_fake_trakt().await;
    fake.script_device(&[200], 1);
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("trakt_credentials.json"));

    let mut shown = None;
    let creds = run_device_flow(&client(&base_url), &store, |code| {
        shown = Some((code.verification_url.clone(), code.user_code.clone()));
    })
    .await
    .unwrap();

    assert_eq!(
        shown,
        Some((
            "https://trakt.tv/activate".to_string(),
            "ABCD1234".to_string()
        ))
    );
    assert_eq!(store.load().await.unwrap(), Some(creds));
}
