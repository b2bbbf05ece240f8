// ABOUTME: Configuration module organizing environment-driven runtime settings
// ABOUTME: Exposes typed configuration for database, auth, provider, and sync concerns
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration management
//!
//! Environment-only configuration: every setting comes from an environment
//! variable with a typed default. No configuration files are read.

/// Environment-based configuration types and parsing
pub mod environment;

pub use environment::{
    AuthConfig, DatabaseConfig, DatabaseUrl, InstagramConfig, LogLevel, ServerConfig, SyncConfig,
};
