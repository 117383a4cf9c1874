// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trakt-Badge batch entry point
//!
//! For CI jobs that regenerate the badge as a file:
//! - `auth` runs the device flow once and writes the credentials file
//! - `render` (default) reads everything from the environment and writes the SVG

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use trakt_badge::config::{DEFAULT_API_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS};
use trakt_badge::services::batch::{require, OUT_OF_BAND_REDIRECT};
use trakt_badge::services::{
    http_client, render_to_file, run_device_flow, RenderRequest, TraktClient,
};
use trakt_badge::store::FileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Authorize this machine with the device flow
    Auth,
    /// Render the badge to a file
    Render,
}

/// Render a Trakt "latest watch" badge from CI
#[derive(Parser, Debug)]
#[command(name = "trakt-badge-batch")]
#[command(version, about = "Render the Trakt badge to a file, or authorize via device code")]
struct Args {
    /// What to do
    #[arg(value_enum, default_value_t = Mode::Render)]
    mode: Mode,

    /// Trakt username whose history is rendered
    #[arg(long, env = "TRAKT_USERNAME")]
    username: Option<String>,

    /// Trakt OAuth client ID
    #[arg(long, env = "TRAKT_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    /// Trakt OAuth client secret
    #[arg(long, env = "TRAKT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Stored credentials as JSON (as written by `auth`)
    #[arg(long, env = "TRAKT_CREDENTIALS", hide_env_values = true)]
    credentials: Option<String>,

    /// Where `auth` writes the credentials
    #[arg(long, env = "TRAKT_CREDENTIALS_FILE", default_value = "trakt_credentials.json")]
    credentials_file: PathBuf,

    /// Where `render` writes the SVG
    #[arg(short, long, default_value = "trakt-badge.svg")]
    output: PathBuf,

    /// Trakt API base URL
    #[arg(long, env = "TRAKT_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Timeout for each outbound request, in seconds
    #[arg(long, env = "TRAKT_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    match args.mode {
        Mode::Auth => authorize(args).await,
        Mode::Render => render(args).await,
    }
}

/// Device flow: print the code, wait for approval, write the credentials file.
async fn authorize(args: Args) -> anyhow::Result<()> {
    let client = TraktClient::new(
        http_client(args.timeout_secs),
        &args.api_base_url,
        require(args.client_id, "TRAKT_CLIENT_ID")?,
        require(args.client_secret, "TRAKT_CLIENT_SECRET")?,
        OUT_OF_BAND_REDIRECT.to_string(),
    );
    let store = FileStore::new(&args.credentials_file);

    let creds = run_device_flow(&client, &store, |code| {
        println!(
            "Go to {} and enter the code: {}",
            code.verification_url, code.user_code
        );
        println!("Waiting for authorization...");
    })
    .await
    .context("Device authorization failed")?;

    println!(
        "Authorized. Credentials written to {} (valid until {}).",
        store.path().display(),
        creds.expires_at()
    );
    println!("Store the file contents in the TRAKT_CREDENTIALS secret for `render`.");
    Ok(())
}

/// Render mode: everything from the environment, no refresh.
async fn render(args: Args) -> anyhow::Result<()> {
    render_to_file(RenderRequest {
        username: args.username,
        client_id: args.client_id,
        client_secret: args.client_secret,
        credentials: args.credentials,
        api_base_url: args.api_base_url,
        timeout_secs: args.timeout_secs,
        output: args.output,
    })
    .await?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "trakt_badge=debug,info"
    } else {
        "trakt_badge=info,warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
