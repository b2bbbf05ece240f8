// ABOUTME: Unified error taxonomy for account linking, post sync, and growth stats
// ABOUTME: Maps each error class to the HTTP status the routing layer should surface
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Unified Error Handling
//!
//! Central error type for the growth core. The routing layer (an external
//! collaborator) converts `AppError` into HTTP responses via [`AppError::http_status`].

use std::fmt;
use thiserror::Error;

/// Unified error type for the growth core
#[derive(Debug, Error)]
pub enum AppError {
    /// Provider app credentials or another required setting is absent.
    /// Fatal server misconfiguration, never caused by user input.
    #[error("configuration missing: {0}")]
    ConfigMissing(&'static str),

    /// The OAuth state token on the callback is invalid or expired
    #[error("invalid state token: {0}")]
    InvalidState(String),

    /// A token exchange with the provider returned a non-success response
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    /// The provider profile fetch returned a non-success response
    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    /// A provider API call failed during sync (network, timeout, or status)
    #[error("external API error: {0}")]
    ExternalApi(String),

    /// The operation requires a resource that is not present
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Malformed caller input, e.g. a missing authorization code
    #[error("validation error: {0}")]
    Validation(String),

    /// A storage operation failed
    #[error("database error: {0}")]
    Database(String),
}

impl AppError {
    /// Get the HTTP status code the routing layer should respond with
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidState(_) => 401,
            Self::NotFound(_) => 404,
            Self::ExchangeFailed(_) | Self::ProfileFetchFailed(_) | Self::ExternalApi(_) => 502,
            Self::ConfigMissing(_) | Self::Database(_) => 500,
        }
    }

    /// Wrap a storage-layer error
    pub fn database(err: impl fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
