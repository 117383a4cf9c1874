// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge endpoints.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::Badge;
use crate::store::SessionStore;
use crate::AppState;

/// Lets CDNs reuse a badge for an hour.
pub const BADGE_CACHE_CONTROL: &str = "s-maxage=3600, stale-while-revalidate";

/// Responses carrying a refreshed session cookie must never reach a shared cache.
pub const SESSION_UPDATE_CACHE_CONTROL: &str = "private, no-store";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trakt", get(session_badge))
        .route("/api/trakt/public", get(public_badge))
}

/// Badge for the credentials held in the caller's session cookie.
async fn session_badge(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Response)> {
    let session = SessionStore::new(
        jar,
        &state.config.session_secret,
        state.config.secure_cookies(),
    );

    let access_token = state.token_manager.ensure_valid(&session).await?;
    let badge = render_latest(&state, &access_token).await;

    let cache_control = if session.is_modified() {
        SESSION_UPDATE_CACHE_CONTROL
    } else {
        BADGE_CACHE_CONTROL
    };

    Ok((session.into_jar(), svg_response(badge, cache_control, false)))
}

/// Badge for the deployment-wide credentials; embeddable from any origin.
async fn public_badge(State(state): State<Arc<AppState>>) -> Result<Response> {
    let store = state
        .shared_store
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("No shared token store configured".to_string()))?;

    let access_token = state.token_manager.ensure_valid(&**store).await?;
    let badge = render_latest(&state, &access_token).await;

    Ok(svg_response(badge, BADGE_CACHE_CONTROL, true))
}

/// Fetch the latest watch and render it; upstream errors become badge text.
async fn render_latest(state: &AppState, access_token: &str) -> Badge {
    let latest = state
        .token_manager
        .client()
        .fetch_latest(&state.config.trakt_username, access_token)
        .await;

    match latest {
        Ok(item) => {
            state
                .renderer
                .render(item.as_ref(), &state.config.profile_link())
                .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "History fetch failed, rendering error badge");
            Badge::error(&e.to_string())
        }
    }
}

fn svg_response(badge: Badge, cache_control: &'static str, public: bool) -> Response {
    let mut response = (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, cache_control),
        ],
        badge.svg,
    )
        .into_response();

    if public {
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
    }

    response
}
