// ABOUTME: Core domain models for linked Instagram accounts and ingested posts
// ABOUTME: Shared between the account vault, the sync engine, and the growth analyzer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Domain models shared across the growth core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A creator's linked Instagram account with its long-lived access credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramAccount {
    /// System-assigned account id
    pub id: Uuid,
    /// Owning user; the linking flow enforces one account per user
    pub user_id: Uuid,
    /// Instagram-assigned user id, globally unique across accounts
    pub ig_user_id: String,
    /// Instagram handle, refreshed on every relink
    pub username: String,
    /// Long-lived access token
    #[serde(skip_serializing)]
    pub access_token: String,
    /// Absolute expiry of the access token
    pub token_expires_at: DateTime<Utc>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Account fields produced by a completed OAuth exchange
#[derive(Debug, Clone)]
pub struct NewInstagramAccount {
    /// Owning user recovered from the state token
    pub user_id: Uuid,
    /// Instagram-assigned user id
    pub ig_user_id: String,
    /// Instagram handle
    pub username: String,
    /// Long-lived access token
    pub access_token: String,
    /// Absolute expiry of the access token
    pub token_expires_at: DateTime<Utc>,
}

/// One unit of Instagram content stored locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramPost {
    /// System-assigned post id
    pub id: Uuid,
    /// Instagram-assigned media id; unique per account
    pub ig_post_id: String,
    /// Owning account
    pub account_id: Uuid,
    /// Caption text, possibly empty
    pub caption: String,
    /// Media type reported by the provider (IMAGE, VIDEO, CAROUSEL_ALBUM)
    pub media_type: String,
    /// Media URL reported by the provider
    pub media_url: String,
    /// Like count, never negative
    pub like_count: i64,
    /// Comment count, never negative
    pub comments_count: i64,
    /// Provider publish time, or the sync time when the provider's
    /// timestamp was missing or unparsable
    pub posted_at: DateTime<Utc>,
    /// Time of the last successful sync of this post
    pub fetched_at: DateTime<Utc>,
}

/// Post fields as normalized from one provider media item
#[derive(Debug, Clone)]
pub struct NewInstagramPost {
    /// Instagram-assigned media id
    pub ig_post_id: String,
    /// Owning account
    pub account_id: Uuid,
    /// Caption text, empty when the provider omitted it
    pub caption: String,
    /// Media type
    pub media_type: String,
    /// Media URL
    pub media_url: String,
    /// Like count, 0 when the provider omitted it
    pub like_count: i64,
    /// Comment count, 0 when the provider omitted it
    pub comments_count: i64,
    /// Publish time after normalization
    pub posted_at: DateTime<Utc>,
}
