// ABOUTME: Drives the authorization-code exchange from callback to stored account
// ABOUTME: Strictly sequential and abortable; no account row exists before the final upsert
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::AuthManager;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{InstagramAccount, NewInstagramAccount};
use crate::providers::InstagramApi;
use crate::sync::SyncScheduler;

/// Drives the Instagram account linking flow
pub struct OAuthManager {
    database: Database,
    api: Arc<dyn InstagramApi>,
    auth: AuthManager,
    scheduler: SyncScheduler,
}

impl OAuthManager {
    /// Create a new linking flow driver
    #[must_use]
    pub fn new(
        database: Database,
        api: Arc<dyn InstagramApi>,
        auth: AuthManager,
        scheduler: SyncScheduler,
    ) -> Self {
        Self {
            database,
            api,
            auth,
            scheduler,
        }
    }

    /// Build the provider authorization URL for `user_id`
    ///
    /// The embedded `state` value is a fresh short-lived token binding the
    /// redirect back to the initiating user.
    ///
    /// # Errors
    ///
    /// Returns an error if state token issuance fails.
    pub fn connect_url(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let state = self.auth.generate_state_token(user_id, email)?;
        Ok(self.api.authorization_url(&state))
    }

    /// Exchange a callback's code and state for a linked account
    ///
    /// The flow is strictly sequential: state validation, code exchange,
    /// long-lived exchange, profile fetch, vault upsert. Any step's failure
    /// aborts the whole flow; no account row is written before the upsert,
    /// so there is nothing to roll back. The short-lived token is discarded
    /// after the long-lived exchange and never persisted.
    ///
    /// On success a post sync is triggered as a detached operation; its
    /// outcome does not affect the linking result.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a missing code or state,
    /// [`AppError::InvalidState`] for a bad state token,
    /// [`AppError::ExchangeFailed`] or [`AppError::ProfileFetchFailed`] for
    /// provider failures, and [`AppError::Database`] for storage failures.
    pub async fn link_account(&self, code: &str, state: &str) -> AppResult<InstagramAccount> {
        if code.trim().is_empty() || state.trim().is_empty() {
            return Err(AppError::Validation("missing code or state".to_string()));
        }

        let owner = self.auth.validate_state_token(state)?;
        debug!("state token verified for user {}", owner.user_id);

        let short_lived = self.api.exchange_code(code).await?;
        let long_lived = self.api.exchange_long_lived(&short_lived).await?;
        let profile = self.api.get_profile(&long_lived.access_token).await?;

        let token_expires_at = Utc::now() + Duration::seconds(long_lived.expires_in);

        let account = self
            .database
            .upsert_instagram_account(&NewInstagramAccount {
                user_id: owner.user_id,
                ig_user_id: profile.id,
                username: profile.username,
                access_token: long_lived.access_token,
                token_expires_at,
            })
            .await
            .map_err(AppError::database)?;

        info!(
            "instagram account {} linked for user {}",
            account.ig_user_id, account.user_id
        );

        self.scheduler.trigger(account.id);

        Ok(account)
    }
}
