// ABOUTME: Background post synchronization with a bounded queue and per-account single-flight
// ABOUTME: Normalizes provider media items and upserts them idempotently into the post store
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Post Synchronization
//!
//! Pulls an account's most recent media page from the provider and upserts
//! each item into the post store. Sync requests run on a background worker
//! fed by a bounded queue; callers enqueue and return immediately. A failed
//! sync never touches previously stored posts and can simply be re-triggered.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::NewInstagramPost;
use crate::providers::{InstagramApi, MediaItem, MEDIA_PAGE_SIZE};

/// Result of one sync pass over an account's media page
#[derive(Debug, Clone, Copy)]
pub struct SyncOutcome {
    /// Items returned by the provider
    pub fetched: usize,
    /// Items successfully upserted
    pub stored: usize,
    /// Items whose upsert failed (logged, never fatal to the pass)
    pub failed: usize,
}

/// Pulls recent posts for one account and upserts them
pub struct PostSyncEngine {
    database: Database,
    api: Arc<dyn InstagramApi>,
}

impl PostSyncEngine {
    /// Create a new sync engine
    #[must_use]
    pub fn new(database: Database, api: Arc<dyn InstagramApi>) -> Self {
        Self { database, api }
    }

    /// Fetch the account's most recent media page and upsert every item
    ///
    /// Item-level failures are logged and skipped; the rest of the page is
    /// still processed. A failure of the media list request itself aborts
    /// the pass and leaves the stored posts untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the account does not exist and
    /// [`AppError::ExternalApi`] when the media list request fails.
    pub async fn sync_account(&self, account_id: Uuid) -> AppResult<SyncOutcome> {
        let account = self
            .database
            .get_instagram_account_by_id(account_id)
            .await
            .map_err(AppError::database)?
            .ok_or(AppError::NotFound("instagram account"))?;

        let items = self
            .api
            .list_media(&account.access_token, MEDIA_PAGE_SIZE)
            .await?;

        let now = Utc::now();
        let mut stored = 0;
        let mut failed = 0;

        for item in &items {
            let post = normalize_media_item(account.id, item, now);
            match self.database.upsert_instagram_post(&post).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    failed += 1;
                    warn!(
                        "failed to store post {} for account {}: {e}",
                        item.id, account.id
                    );
                }
            }
        }

        info!(
            "post sync for account {}: {} fetched, {stored} stored, {failed} failed",
            account.id,
            items.len()
        );

        Ok(SyncOutcome {
            fetched: items.len(),
            stored,
            failed,
        })
    }
}

/// Convert one provider media item into storable post fields
///
/// Missing counts become 0 and a missing or unparsable timestamp falls back
/// to the sync time. The fallback is a deliberate best-effort policy, not
/// silent data loss.
fn normalize_media_item(
    account_id: Uuid,
    item: &MediaItem,
    sync_time: DateTime<Utc>,
) -> NewInstagramPost {
    NewInstagramPost {
        ig_post_id: item.id.clone(),
        account_id,
        caption: item.caption.clone().unwrap_or_default(),
        media_type: item.media_type.clone().unwrap_or_default(),
        media_url: item.media_url.clone().unwrap_or_default(),
        like_count: item.like_count.unwrap_or(0).max(0),
        comments_count: item.comments_count.unwrap_or(0).max(0),
        posted_at: parse_media_timestamp(item.timestamp.as_deref(), sync_time),
    }
}

/// Parse the provider's publish timestamp
///
/// The Graph API emits RFC 3339 with a compact `+0000` offset; both forms
/// are accepted.
fn parse_media_timestamp(raw: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw else {
        return fallback;
    };

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map_or(fallback, |parsed| parsed.with_timezone(&Utc))
}

/// Messages accepted by the sync worker
enum SyncMessage {
    /// Run a sync pass for one account
    Account(Uuid),
    /// Drain the queue and stop
    Shutdown,
}

/// Hands sync requests to the background worker
///
/// `trigger` is fire-and-forget: the caller gets no result and failures are
/// logged by the worker. At most one sync per account is queued or running
/// at a time; redundant triggers are skipped.
#[derive(Clone)]
pub struct SyncScheduler {
    tx: mpsc::Sender<SyncMessage>,
    in_flight: Arc<DashMap<Uuid, ()>>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SyncScheduler {
    /// Spawn the background worker and return its scheduler handle
    #[must_use]
    pub fn start(engine: PostSyncEngine, queue_capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel(queue_capacity.max(1));
        let in_flight: Arc<DashMap<Uuid, ()>> = Arc::new(DashMap::new());

        let worker_in_flight = Arc::clone(&in_flight);
        let worker = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    SyncMessage::Account(account_id) => {
                        match engine.sync_account(account_id).await {
                            Ok(outcome) => debug!(
                                "sync pass done for account {account_id}: {} stored",
                                outcome.stored
                            ),
                            Err(e) => error!("post sync failed for account {account_id}: {e}"),
                        }
                        worker_in_flight.remove(&account_id);
                    }
                    SyncMessage::Shutdown => break,
                }
            }
        });

        Self {
            tx,
            in_flight,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Enqueue a sync pass for `account_id` and return immediately
    ///
    /// Skipped when a pass for the same account is already queued or
    /// running, and dropped (with a log line) when the queue is full; a
    /// dropped trigger can simply be re-issued.
    pub fn trigger(&self, account_id: Uuid) {
        if self.in_flight.insert(account_id, ()).is_some() {
            debug!("sync already in flight for account {account_id}, skipping trigger");
            return;
        }

        if let Err(e) = self.tx.try_send(SyncMessage::Account(account_id)) {
            self.in_flight.remove(&account_id);
            warn!("sync queue full, dropping trigger for account {account_id}: {e}");
        }
    }

    /// Drain queued work and stop the worker
    ///
    /// Requests enqueued before the call are still processed.
    pub async fn shutdown(&self) {
        if self.tx.send(SyncMessage::Shutdown).await.is_err() {
            // Worker already gone; nothing to drain.
            return;
        }

        if let Some(handle) = self.worker.lock().await.take() {
            if let Err(e) = handle.await {
                error!("sync worker terminated abnormally: {e}");
            }
        }
    }
}
