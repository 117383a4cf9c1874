// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth device flow for headless (batch/CI) use.

use crate::error::AppError;
use crate::models::Credentials;
use crate::services::trakt::{DeviceCode, DevicePoll, TraktClient};
use crate::store::{StoreError, TokenStore};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::Instant;

/// Device flow errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceFlowError {
    #[error(transparent)]
    Request(#[from] AppError),

    #[error("Authorization rejected (HTTP {0})")]
    Rejected(StatusCode),

    #[error("Device code expired before the user authorized")]
    Expired,

    #[error("Failed to store credentials: {0}")]
    Store(#[from] StoreError),
}

/// Poll until the user authorizes, the server rejects, or the code expires.
///
/// Sleeps `interval` seconds before every poll. HTTP 400 means "still
/// pending"; any other non-200 status ends the flow immediately.
pub async fn poll_for_token(
    client: &TraktClient,
    code: &DeviceCode,
) -> Result<Credentials, DeviceFlowError> {
    let interval = Duration::from_secs(code.interval.max(1));
    let deadline = Instant::now() + Duration::from_secs(code.expires_in);
    let mut attempts = 0u32;

    loop {
        tokio::time::sleep(interval).await;
        if Instant::now() >= deadline {
            tracing::warn!(attempts, "Device code expired");
            return Err(DeviceFlowError::Expired);
        }

        attempts += 1;
        match client.poll_device_token(&code.device_code).await? {
            DevicePoll::Authorized(creds) => {
                tracing::info!(attempts, "Device authorized");
                return Ok(creds);
            }
            DevicePoll::Pending => {
                tracing::debug!(attempts, "Authorization pending");
            }
            DevicePoll::Rejected(status) => {
                tracing::warn!(attempts, status = %status, "Device authorization rejected");
                return Err(DeviceFlowError::Rejected(status));
            }
        }
    }
}

/// Run the whole flow: request a code, show it, poll, persist.
///
/// `prompt` receives the code so the caller can show the user where to go.
pub async fn run_device_flow<F>(
    client: &TraktClient,
    store: &dyn TokenStore,
    prompt: F,
) -> Result<Credentials, DeviceFlowError>
where
    F: FnOnce(&DeviceCode),
{
    let code = client.request_device_code().await?;
    tracing::info!(
        verification_url = %code.verification_url,
        interval = code.interval,
        expires_in = code.expires_in,
        "Device code issued"
    );
    prompt(&code);

    let creds = poll_for_token(client, &code).await?;
    Ok(store.save(creds).await?)
}
