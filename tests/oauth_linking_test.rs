// ABOUTME: Integration tests for the account linking flow
// ABOUTME: Covers the happy path, every abort point, and the detached sync trigger
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Integration tests for OAuth account linking

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::StubInstagramApi;
use glow_growth_core::auth::AuthManager;
use glow_growth_core::database::Database;
use glow_growth_core::errors::AppError;
use glow_growth_core::oauth::OAuthManager;
use glow_growth_core::sync::{PostSyncEngine, SyncScheduler};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use uuid::Uuid;

const TEST_SECRET: &str = "test-signing-secret";

fn build_manager(db: &Database, api: Arc<StubInstagramApi>) -> OAuthManager {
    let engine = PostSyncEngine::new(db.clone(), api.clone());
    let scheduler = SyncScheduler::start(engine, 8);
    OAuthManager::new(db.clone(), api, AuthManager::new(TEST_SECRET, 10), scheduler)
}

fn issue_state(user_id: Uuid) -> String {
    AuthManager::new(TEST_SECRET, 10)
        .generate_state_token(user_id, "creator@example.com")
        .unwrap()
}

#[tokio::test]
async fn link_account_stores_the_long_lived_credential() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::default());
    let manager = build_manager(&db, Arc::clone(&api));

    let user_id = Uuid::new_v4();
    let before = Utc::now();
    let account = manager
        .link_account("auth-code", &issue_state(user_id))
        .await
        .unwrap();

    assert_eq!(account.user_id, user_id);
    assert_eq!(account.ig_user_id, api.profile_id);
    assert_eq!(account.username, api.username);
    assert_eq!(account.access_token, "long-lived-token");

    // Expiry is now + the provider-reported lifetime
    let expected = before + Duration::seconds(api.expires_in);
    assert!(account.token_expires_at >= expected - Duration::seconds(5));
    assert!(account.token_expires_at <= expected + Duration::seconds(5));

    let stored = db
        .get_instagram_account_by_user(user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, account.id);
}

#[tokio::test]
async fn link_account_triggers_a_detached_sync() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::with_media(vec![common::media_item(
        "m1",
        Some(12),
        Some(3),
        Some("2025-06-01T08:00:00+00:00"),
    )]));
    let manager = build_manager(&db, Arc::clone(&api));

    let account = manager
        .link_account("auth-code", &issue_state(Uuid::new_v4()))
        .await
        .unwrap();

    // The sync runs detached; poll briefly until the worker lands the post
    let mut posts = Vec::new();
    for _ in 0..50 {
        posts = db.list_posts_by_account(account.id, 50).await.unwrap();
        if !posts.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].ig_post_id, "m1");
    assert_eq!(api.media_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_code_or_state_is_a_validation_error() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::default());
    let manager = build_manager(&db, api);

    let result = manager.link_account("", &issue_state(Uuid::new_v4())).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let result = manager.link_account("auth-code", "  ").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn bad_state_token_aborts_before_any_exchange() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::default());
    let manager = build_manager(&db, api);

    let forged = AuthManager::new("wrong-secret", 10)
        .generate_state_token(Uuid::new_v4(), "creator@example.com")
        .unwrap();

    let result = manager.link_account("auth-code", &forged).await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn exchange_failure_leaves_no_partial_account() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::default());
    api.fail_exchange.store(true, Ordering::SeqCst);
    let manager = build_manager(&db, Arc::clone(&api));

    let user_id = Uuid::new_v4();
    let result = manager.link_account("auth-code", &issue_state(user_id)).await;
    assert!(matches!(result, Err(AppError::ExchangeFailed(_))));
    assert!(db
        .get_instagram_account_by_user(user_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn long_lived_exchange_failure_leaves_no_partial_account() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::default());
    api.fail_long_lived.store(true, Ordering::SeqCst);
    let manager = build_manager(&db, Arc::clone(&api));

    let user_id = Uuid::new_v4();
    let result = manager.link_account("auth-code", &issue_state(user_id)).await;
    assert!(matches!(result, Err(AppError::ExchangeFailed(_))));
    assert!(db
        .get_instagram_account_by_user(user_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn profile_fetch_failure_leaves_no_partial_account() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::default());
    api.fail_profile.store(true, Ordering::SeqCst);
    let manager = build_manager(&db, Arc::clone(&api));

    let user_id = Uuid::new_v4();
    let result = manager.link_account("auth-code", &issue_state(user_id)).await;
    assert!(matches!(result, Err(AppError::ProfileFetchFailed(_))));
    assert!(db
        .get_instagram_account_by_user(user_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn relinking_the_same_profile_keeps_a_single_row() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::default());
    let manager = build_manager(&db, Arc::clone(&api));

    let user_id = Uuid::new_v4();
    let first = manager
        .link_account("auth-code", &issue_state(user_id))
        .await
        .unwrap();
    let second = manager
        .link_account("another-code", &issue_state(user_id))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.ig_user_id, second.ig_user_id);
}

#[tokio::test]
async fn connect_url_embeds_a_valid_state_token() {
    let db = common::create_test_db().await.unwrap();
    let api = Arc::new(StubInstagramApi::default());
    let manager = build_manager(&db, api);

    let user_id = Uuid::new_v4();
    let url = manager.connect_url(user_id, "creator@example.com").unwrap();

    let state = url.split("state=").nth(1).unwrap();
    let verified = AuthManager::new(TEST_SECRET, 10)
        .validate_state_token(state)
        .unwrap();
    assert_eq!(verified.user_id, user_id);
    assert_eq!(verified.email, "creator@example.com");
}
