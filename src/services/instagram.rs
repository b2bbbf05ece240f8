// ABOUTME: The core-exposed Instagram operation surface: link, sync, stats, posts, disconnect
// ABOUTME: Performs the account-presence checks the routing layer relies on for 404s
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Instagram Service
//!
//! The operations the (external) routing layer calls into. Each operation
//! that requires a linked account resolves it first and fails with
//! `NotFound` when the user has none.

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthManager;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::intelligence::{GrowthAnalyzer, GrowthStats, PeriodDays};
use crate::models::{InstagramAccount, InstagramPost};
use crate::oauth::OAuthManager;
use crate::providers::InstagramApi;
use crate::sync::SyncScheduler;

/// Public identity of a linked account, safe to echo in responses
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    /// Stored account id
    pub id: Uuid,
    /// Instagram handle
    pub username: String,
}

impl From<&InstagramAccount> for AccountSummary {
    fn from(account: &InstagramAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
        }
    }
}

/// Acknowledgement that a sync was scheduled
#[derive(Debug, Clone, Serialize)]
pub struct SyncAccepted {
    /// Always `"fetch scheduled"`; the sync itself runs detached
    pub status: String,
    /// The account the sync was scheduled for
    pub account: AccountSummary,
}

/// A statistics snapshot bundled with the account it describes
#[derive(Debug, Clone, Serialize)]
pub struct AccountStats {
    /// The account the snapshot describes
    pub account: AccountSummary,
    /// The computed snapshot
    pub stats: GrowthStats,
}

/// The core-exposed Instagram operation surface
pub struct InstagramService {
    database: Database,
    oauth: OAuthManager,
    analyzer: GrowthAnalyzer,
    scheduler: SyncScheduler,
}

impl InstagramService {
    /// Wire the service from its components
    #[must_use]
    pub fn new(
        database: Database,
        api: Arc<dyn InstagramApi>,
        auth: AuthManager,
        scheduler: SyncScheduler,
    ) -> Self {
        let oauth = OAuthManager::new(database.clone(), api, auth, scheduler.clone());
        let analyzer = GrowthAnalyzer::new(database.clone());

        Self {
            database,
            oauth,
            analyzer,
            scheduler,
        }
    }

    /// Build the authorization URL that starts the linking flow
    ///
    /// # Errors
    ///
    /// Returns an error if state token issuance fails.
    pub fn connect_url(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        self.oauth.connect_url(user_id, email)
    }

    /// Complete the linking flow from the OAuth callback
    ///
    /// # Errors
    ///
    /// Propagates linking errors; see [`OAuthManager::link_account`].
    pub async fn link_account(&self, code: &str, state: &str) -> AppResult<InstagramAccount> {
        self.oauth.link_account(code, state).await
    }

    /// Schedule a detached post sync for the user's linked account
    ///
    /// Returns immediately; the sync outcome is logged by the worker, never
    /// reported to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the user has no linked account.
    pub async fn trigger_sync(&self, user_id: Uuid) -> AppResult<SyncAccepted> {
        let account = self.require_account(user_id).await?;
        self.scheduler.trigger(account.id);

        Ok(SyncAccepted {
            status: "fetch scheduled".to_string(),
            account: AccountSummary::from(&account),
        })
    }

    /// Compute the growth statistics snapshot for the user's linked account
    ///
    /// `period_query` accepts the shorthand values `7`/`week`, `14`,
    /// `30`/`month`, and `90`; anything else falls back to 30 days.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the user has no linked account
    /// and [`AppError::Database`] when the snapshot computation fails.
    pub async fn compute_stats(
        &self,
        user_id: Uuid,
        period_query: Option<&str>,
    ) -> AppResult<AccountStats> {
        let account = self.require_account(user_id).await?;
        let period = PeriodDays::from_query(period_query);
        let stats = self.analyzer.compute_stats(account.id, period).await?;

        Ok(AccountStats {
            account: AccountSummary::from(&account),
            stats,
        })
    }

    /// List the stored posts of the user's linked account, most recent first
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the user has no linked account.
    pub async fn list_posts(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<InstagramPost>> {
        let account = self.require_account(user_id).await?;
        self.database
            .list_posts_by_account(account.id, limit)
            .await
            .map_err(AppError::database)
    }

    /// Disconnect the user's linked account, deleting it and all its posts
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the user has no linked account.
    pub async fn disconnect(&self, user_id: Uuid) -> AppResult<AccountSummary> {
        let account = self.require_account(user_id).await?;
        self.database
            .delete_instagram_account_by_user(user_id)
            .await
            .map_err(AppError::database)?;

        Ok(AccountSummary::from(&account))
    }

    async fn require_account(&self, user_id: Uuid) -> AppResult<InstagramAccount> {
        self.database
            .get_instagram_account_by_user(user_id)
            .await
            .map_err(AppError::database)?
            .ok_or(AppError::NotFound("instagram account"))
    }
}
