// ABOUTME: OAuth module organizing the Instagram account linking flow
// ABOUTME: Centralizes state-token handling, code exchange, and account binding
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # OAuth Account Linking
//!
//! Converts an authorization code plus a previously issued state token into
//! a linked [`crate::models::InstagramAccount`].

/// The linking flow driver
pub mod manager;

pub use manager::OAuthManager;
