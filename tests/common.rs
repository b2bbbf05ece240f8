// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides the in-memory database, stub provider, and seeding helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
#![allow(missing_docs)]

//! Shared test utilities for `glow_growth_core`

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use uuid::Uuid;

use glow_growth_core::database::Database;
use glow_growth_core::errors::{AppError, AppResult};
use glow_growth_core::logging::{init_logging, LogFormat, LoggingConfig};
use glow_growth_core::models::{InstagramAccount, NewInstagramAccount, NewInstagramPost};
use glow_growth_core::providers::{InstagramApi, InstagramProfile, LongLivedToken, MediaItem};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        };
        let _ = init_logging(&config);
    });
}

/// Create a test database instance
///
/// Each connection gets its own isolated in-memory instance.
pub async fn create_test_db() -> Result<Database> {
    init_test_logging();
    Database::new("sqlite::memory:").await
}

/// Link a test account for `user_id` directly through the vault
pub async fn seed_account(db: &Database, user_id: Uuid, ig_user_id: &str) -> InstagramAccount {
    db.upsert_instagram_account(&NewInstagramAccount {
        user_id,
        ig_user_id: ig_user_id.to_string(),
        username: format!("creator_{ig_user_id}"),
        access_token: "stored-access-token".to_string(),
        token_expires_at: Utc::now() + Duration::days(60),
    })
    .await
    .unwrap()
}

/// Store one post with explicit engagement counts and publish time
pub async fn seed_post(
    db: &Database,
    account_id: Uuid,
    ig_post_id: &str,
    like_count: i64,
    comments_count: i64,
    posted_at: DateTime<Utc>,
) {
    db.upsert_instagram_post(&NewInstagramPost {
        ig_post_id: ig_post_id.to_string(),
        account_id,
        caption: format!("caption for {ig_post_id}"),
        media_type: "IMAGE".to_string(),
        media_url: format!("https://cdn.example.com/{ig_post_id}.jpg"),
        like_count,
        comments_count,
        posted_at,
    })
    .await
    .unwrap();
}

/// Build a provider media item for stub responses
pub fn media_item(
    id: &str,
    like_count: Option<i64>,
    comments_count: Option<i64>,
    timestamp: Option<&str>,
) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        caption: Some(format!("caption for {id}")),
        media_type: Some("IMAGE".to_string()),
        media_url: Some(format!("https://cdn.example.com/{id}.jpg")),
        timestamp: timestamp.map(str::to_string),
        like_count,
        comments_count,
    }
}

/// Scriptable in-process stand-in for the Instagram Graph API
///
/// Each failure flag makes the corresponding endpoint return its error;
/// `media_calls` counts list requests so tests can observe single-flight
/// behavior, and `media_delay_ms` keeps a sync pass in flight long enough
/// to race against.
pub struct StubInstagramApi {
    pub profile_id: String,
    pub username: String,
    pub expires_in: i64,
    pub media: Mutex<Vec<MediaItem>>,
    pub fail_exchange: AtomicBool,
    pub fail_long_lived: AtomicBool,
    pub fail_profile: AtomicBool,
    pub fail_media: AtomicBool,
    pub media_calls: AtomicUsize,
    pub media_delay_ms: AtomicU64,
}

impl Default for StubInstagramApi {
    fn default() -> Self {
        Self {
            profile_id: "17841400000000001".to_string(),
            username: "glow_creator".to_string(),
            expires_in: 5_184_000, // 60 days, the provider's long-lived lifetime
            media: Mutex::new(Vec::new()),
            fail_exchange: AtomicBool::new(false),
            fail_long_lived: AtomicBool::new(false),
            fail_profile: AtomicBool::new(false),
            fail_media: AtomicBool::new(false),
            media_calls: AtomicUsize::new(0),
            media_delay_ms: AtomicU64::new(0),
        }
    }
}

impl StubInstagramApi {
    pub fn with_media(items: Vec<MediaItem>) -> Self {
        let stub = Self::default();
        *stub.media.lock().unwrap() = items;
        stub
    }

    pub fn set_media(&self, items: Vec<MediaItem>) {
        *self.media.lock().unwrap() = items;
    }
}

#[async_trait]
impl InstagramApi for StubInstagramApi {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://auth.example.com/oauth?state={state}")
    }

    async fn exchange_code(&self, _code: &str) -> AppResult<String> {
        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(AppError::ExchangeFailed(
                "token endpoint returned 400 Bad Request".to_string(),
            ));
        }
        Ok("short-lived-token".to_string())
    }

    async fn exchange_long_lived(&self, _short_lived_token: &str) -> AppResult<LongLivedToken> {
        if self.fail_long_lived.load(Ordering::SeqCst) {
            return Err(AppError::ExchangeFailed(
                "long-lived exchange returned 400 Bad Request".to_string(),
            ));
        }
        Ok(LongLivedToken {
            access_token: "long-lived-token".to_string(),
            expires_in: self.expires_in,
        })
    }

    async fn get_profile(&self, _access_token: &str) -> AppResult<InstagramProfile> {
        if self.fail_profile.load(Ordering::SeqCst) {
            return Err(AppError::ProfileFetchFailed(
                "profile endpoint returned 401 Unauthorized".to_string(),
            ));
        }
        Ok(InstagramProfile {
            id: self.profile_id.clone(),
            username: self.username.clone(),
        })
    }

    async fn list_media(&self, _access_token: &str, _limit: usize) -> AppResult<Vec<MediaItem>> {
        self.media_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.media_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }

        if self.fail_media.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApi(
                "media endpoint returned 500 Internal Server Error".to_string(),
            ));
        }

        Ok(self.media.lock().unwrap().clone())
    }
}
