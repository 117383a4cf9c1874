// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Normalized "last watched" record rendered into the badge.

use serde::Serialize;

/// What kind of history entry was watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchedKind {
    Movie,
    Episode,
}

/// The most recent watch, independent of the Trakt JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchedItem {
    pub kind: WatchedKind,
    /// Movie title, or show title for episodes
    pub title: String,
    pub year: Option<i32>,
    pub season: Option<u32>,
    pub episode_number: Option<u32>,
    pub tagline: Option<String>,
    /// Genre slugs in API order
    pub genres: Vec<String>,
    /// Logo reference, possibly without a scheme
    pub logo_url: Option<String>,
}
