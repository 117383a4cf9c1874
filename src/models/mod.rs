// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credentials;
pub mod watched;

pub use credentials::Credentials;
pub use watched::{WatchedItem, WatchedKind};
