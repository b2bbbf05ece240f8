// ABOUTME: Integration tests for the core-exposed service operation surface
// ABOUTME: Covers account-presence checks, sync acknowledgement, and disconnect semantics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Integration tests for the Instagram service facade

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::StubInstagramApi;
use glow_growth_core::auth::AuthManager;
use glow_growth_core::database::Database;
use glow_growth_core::errors::AppError;
use glow_growth_core::services::InstagramService;
use glow_growth_core::sync::{PostSyncEngine, SyncScheduler};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use uuid::Uuid;

const TEST_SECRET: &str = "test-signing-secret";

async fn build_service(api: Arc<StubInstagramApi>) -> (Database, InstagramService) {
    let db = common::create_test_db().await.unwrap();
    let engine = PostSyncEngine::new(db.clone(), api.clone());
    let scheduler = SyncScheduler::start(engine, 8);
    let service = InstagramService::new(
        db.clone(),
        api,
        AuthManager::new(TEST_SECRET, 10),
        scheduler,
    );
    (db, service)
}

#[tokio::test]
async fn operations_without_a_linked_account_are_not_found() {
    let (_db, service) = build_service(Arc::new(StubInstagramApi::default())).await;
    let user_id = Uuid::new_v4();

    assert!(matches!(
        service.trigger_sync(user_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.compute_stats(user_id, None).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.list_posts(user_id, 50).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.disconnect(user_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn trigger_sync_acknowledges_and_runs_detached() {
    let api = Arc::new(StubInstagramApi::with_media(vec![common::media_item(
        "m1",
        Some(10),
        Some(2),
        Some("2025-06-01T08:00:00+00:00"),
    )]));
    let (db, service) = build_service(Arc::clone(&api)).await;

    let user_id = Uuid::new_v4();
    let account = common::seed_account(&db, user_id, "ig-1").await;

    let accepted = service.trigger_sync(user_id).await.unwrap();
    assert_eq!(accepted.status, "fetch scheduled");
    assert_eq!(accepted.account.id, account.id);
    assert_eq!(accepted.account.username, account.username);

    // The pass completes on the worker, not in the request path
    let mut posts = Vec::new();
    for _ in 0..50 {
        posts = db.list_posts_by_account(account.id, 50).await.unwrap();
        if !posts.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(posts.len(), 1);
    assert_eq!(api.media_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn compute_stats_falls_back_to_thirty_days_on_unknown_period() {
    let (db, service) = build_service(Arc::new(StubInstagramApi::default())).await;
    let user_id = Uuid::new_v4();
    let account = common::seed_account(&db, user_id, "ig-1").await;
    common::seed_post(&db, account.id, "p1", 10, 2, Utc::now() - Duration::days(1)).await;

    let result = service.compute_stats(user_id, Some("quarterly")).await.unwrap();
    assert_eq!(result.stats.period_days, 30);
    assert_eq!(result.account.id, account.id);

    let result = service.compute_stats(user_id, Some("week")).await.unwrap();
    assert_eq!(result.stats.period_days, 7);

    let result = service.compute_stats(user_id, None).await.unwrap();
    assert_eq!(result.stats.period_days, 30);
}

#[tokio::test]
async fn list_posts_returns_most_recent_first() {
    let (db, service) = build_service(Arc::new(StubInstagramApi::default())).await;
    let user_id = Uuid::new_v4();
    let account = common::seed_account(&db, user_id, "ig-1").await;

    let now = Utc::now();
    common::seed_post(&db, account.id, "older", 1, 0, now - Duration::days(3)).await;
    common::seed_post(&db, account.id, "newest", 2, 0, now - Duration::days(1)).await;
    common::seed_post(&db, account.id, "middle", 3, 0, now - Duration::days(2)).await;

    let posts = service.list_posts(user_id, 50).await.unwrap();
    let ids: Vec<_> = posts.iter().map(|p| p.ig_post_id.as_str()).collect();
    assert_eq!(ids, vec!["newest", "middle", "older"]);

    let posts = service.list_posts(user_id, 2).await.unwrap();
    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn disconnect_removes_the_account_and_its_posts() {
    let (db, service) = build_service(Arc::new(StubInstagramApi::default())).await;
    let user_id = Uuid::new_v4();
    let account = common::seed_account(&db, user_id, "ig-1").await;
    common::seed_post(&db, account.id, "p1", 10, 2, Utc::now() - Duration::days(1)).await;

    let removed = service.disconnect(user_id).await.unwrap();
    assert_eq!(removed.id, account.id);
    assert_eq!(removed.username, account.username);

    assert!(db
        .get_instagram_account_by_user(user_id)
        .await
        .unwrap()
        .is_none());
    assert!(db
        .list_posts_by_account(account.id, 50)
        .await
        .unwrap()
        .is_empty());

    // A second disconnect finds nothing to remove
    assert!(matches!(
        service.disconnect(user_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn connect_url_carries_the_signed_state() {
    let (_db, service) = build_service(Arc::new(StubInstagramApi::default())).await;
    let user_id = Uuid::new_v4();

    let url = service.connect_url(user_id, "creator@example.com").unwrap();
    let state = url.split("state=").nth(1).unwrap();

    let verified = AuthManager::new(TEST_SECRET, 10)
        .validate_state_token(state)
        .unwrap();
    assert_eq!(verified.user_id, user_id);
}

#[tokio::test]
async fn link_account_through_the_service_stores_the_account() {
    let (db, service) = build_service(Arc::new(StubInstagramApi::default())).await;
    let user_id = Uuid::new_v4();

    let state = AuthManager::new(TEST_SECRET, 10)
        .generate_state_token(user_id, "creator@example.com")
        .unwrap();
    let account = service.link_account("auth-code", &state).await.unwrap();

    assert_eq!(account.user_id, user_id);
    assert!(db
        .get_instagram_account_by_user(user_id)
        .await
        .unwrap()
        .is_some());
}
