// ABOUTME: Main library entry point for the Glow growth analytics platform
// ABOUTME: Links creator Instagram accounts, syncs posts, and computes engagement trends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Glow Growth Server
//!
//! The core of a creator growth analytics service. It links a creator's
//! Instagram account through the OAuth authorization-code flow, keeps a
//! local copy of their recent posts in sync, and computes period-over-period
//! engagement statistics on demand.
//!
//! ## Architecture
//!
//! - **Providers**: Instagram Graph API client behind a trait seam
//! - **OAuth**: state-token handling and the account linking flow
//! - **Database**: SQLite storage for accounts and posts
//! - **Sync**: queue-backed background post ingestion
//! - **Intelligence**: derived growth statistics
//! - **Services**: the operation surface the routing layer consumes
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use glow_growth_core::config::ServerConfig;
//! use glow_growth_core::database::Database;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env();
//!     let database = Database::new(&config.database.url.to_connection_string()).await?;
//!
//!     println!("Glow growth core ready: {}", config.database.url);
//!     database.close().await;
//!     Ok(())
//! }
//! ```

/// State token issuance and validation for the OAuth redirect round-trip
pub mod auth;

/// Configuration management
pub mod config;

/// Database management for accounts and posts
pub mod database;

/// Unified error handling with HTTP status mapping
pub mod errors;

/// Derived engagement analytics
pub mod intelligence;

/// Structured logging setup
pub mod logging;

/// Domain models shared across the crate
pub mod models;

/// The Instagram account linking flow
pub mod oauth;

/// External provider clients
pub mod providers;

/// Core-exposed service operations
pub mod services;

/// Background post synchronization
pub mod sync;
