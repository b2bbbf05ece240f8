// ABOUTME: Signed state token issuance and validation for the OAuth redirect round-trip
// ABOUTME: Binds the initiating user's identity to the callback via short-lived HS256 JWTs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # State Token Management
//!
//! The OAuth `state` parameter is a short-lived signed JWT carrying the
//! initiating user's identity. Validating it on the callback both protects
//! against CSRF and recovers which user started the flow.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::errors::{AppError, AppResult};

/// Claims carried by a state token
#[derive(Debug, Serialize, Deserialize)]
pub struct StateClaims {
    /// Initiating user id
    pub user_id: String,
    /// Initiating user email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// A validated state token, resolved back to the initiating user
#[derive(Debug, Clone)]
pub struct VerifiedState {
    /// User who started the linking flow
    pub user_id: Uuid,
    /// Their email at the time the flow started
    pub email: String,
}

/// Issues and validates state tokens
pub struct AuthManager {
    secret: String,
    state_token_expiry_minutes: i64,
}

impl AuthManager {
    /// Create a new manager with an explicit secret
    #[must_use]
    pub fn new(secret: impl Into<String>, state_token_expiry_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            state_token_expiry_minutes,
        }
    }

    /// Create a manager from configuration
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConfigMissing`] when no signing secret is configured.
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        let secret = config.require_jwt_secret()?;
        Ok(Self::new(secret, config.state_token_expiry_minutes))
    }

    /// Issue a short-lived state token binding the flow to `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_state_token(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::minutes(self.state_token_expiry_minutes);

        let claims = StateClaims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::InvalidState(format!("failed to sign state token: {e}")))
    }

    /// Validate a state token and recover the initiating user
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidState`] when the token is expired, has a
    /// bad signature, or is otherwise malformed.
    pub fn validate_state_token(&self, token: &str) -> AppResult<VerifiedState> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<StateClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AppError::InvalidState(e.to_string()))?;

        let user_id = Uuid::parse_str(&data.claims.user_id)
            .map_err(|e| AppError::InvalidState(format!("bad user id in state token: {e}")))?;

        Ok(VerifiedState {
            user_id,
            email: data.claims.email,
        })
    }
}
