// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod badge;
pub mod batch;
pub mod device;
pub mod image;
pub mod token_manager;
pub mod trakt;

pub use badge::{Badge, BadgeRenderer};
pub use batch::{render_to_file, RenderRequest};
pub use device::{run_device_flow, DeviceFlowError};
pub use image::{ImageFetcher, LogoSource};
pub use token_manager::TokenManager;
pub use trakt::{http_client, DeviceCode, TraktClient};
