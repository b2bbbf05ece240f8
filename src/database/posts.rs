// ABOUTME: Instagram post storage with idempotent upsert keyed by (account_id, ig_post_id)
// ABOUTME: Provides the windowed aggregate and best-post queries the growth analyzer reads
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::Database;
use crate::models::{InstagramPost, NewInstagramPost};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

/// Aggregate counts over a posting window
#[derive(Debug, Clone, Copy, Default)]
pub struct PostAggregates {
    /// Number of posts in the window
    pub post_count: i64,
    /// Sum of like counts, 0 when the window is empty
    pub total_likes: i64,
    /// Sum of comment counts, 0 when the window is empty
    pub total_comments: i64,
}

impl Database {
    /// Create `instagram_posts` table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails.
    pub(super) async fn migrate_instagram_posts(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS instagram_posts (
                id TEXT PRIMARY KEY,
                ig_post_id TEXT NOT NULL,
                account_id TEXT NOT NULL REFERENCES instagram_accounts(id) ON DELETE CASCADE,
                caption TEXT NOT NULL DEFAULT '',
                media_type TEXT NOT NULL DEFAULT '',
                media_url TEXT NOT NULL DEFAULT '',
                like_count INTEGER NOT NULL DEFAULT 0,
                comments_count INTEGER NOT NULL DEFAULT 0,
                posted_at DATETIME NOT NULL,
                fetched_at DATETIME NOT NULL,
                UNIQUE(account_id, ig_post_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_instagram_posts_account_posted
             ON instagram_posts(account_id, posted_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or update a post keyed by `(account_id, ig_post_id)`
    ///
    /// Re-syncing a known post updates its mutable fields and refreshes
    /// `fetched_at` instead of creating a duplicate.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn upsert_instagram_post(&self, post: &NewInstagramPost) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO instagram_posts (
                id, ig_post_id, account_id, caption, media_type, media_url,
                like_count, comments_count, posted_at, fetched_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (account_id, ig_post_id)
            DO UPDATE SET
                caption = EXCLUDED.caption,
                media_type = EXCLUDED.media_type,
                media_url = EXCLUDED.media_url,
                like_count = EXCLUDED.like_count,
                comments_count = EXCLUDED.comments_count,
                posted_at = EXCLUDED.posted_at,
                fetched_at = EXCLUDED.fetched_at
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&post.ig_post_id)
        .bind(post.account_id.to_string())
        .bind(&post.caption)
        .bind(&post.media_type)
        .bind(&post.media_url)
        .bind(post.like_count)
        .bind(post.comments_count)
        .bind(post.posted_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List an account's stored posts, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_posts_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> Result<Vec<InstagramPost>> {
        let rows = sqlx::query(
            r"
            SELECT id, ig_post_id, account_id, caption, media_type, media_url,
                   like_count, comments_count, posted_at, fetched_at
            FROM instagram_posts
            WHERE account_id = $1
            ORDER BY posted_at DESC
            LIMIT $2
            ",
        )
        .bind(account_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            posts.push(Self::row_to_instagram_post(&row)?);
        }
        Ok(posts)
    }

    /// Aggregate post counts over `[start, end)`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn post_window_aggregates(
        &self,
        account_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PostAggregates> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) as post_count,
                   COALESCE(SUM(like_count), 0) as total_likes,
                   COALESCE(SUM(comments_count), 0) as total_comments
            FROM instagram_posts
            WHERE account_id = $1
              AND posted_at >= $2
              AND posted_at < $3
            ",
        )
        .bind(account_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(PostAggregates {
            post_count: row.get("post_count"),
            total_likes: row.get("total_likes"),
            total_comments: row.get("total_comments"),
        })
    }

    /// Count posts published since `since`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_posts_since(&self, account_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) as post_count
            FROM instagram_posts
            WHERE account_id = $1
              AND posted_at >= $2
            ",
        )
        .bind(account_id.to_string())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("post_count"))
    }

    /// The highest-engagement post in `[start, end)`, or `None` for an
    /// empty window
    ///
    /// Ties on `like_count + comments_count` break deterministically to the
    /// most recent `posted_at`, then to the greatest `ig_post_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn best_post_in_window(
        &self,
        account_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<InstagramPost>> {
        let row = sqlx::query(
            r"
            SELECT id, ig_post_id, account_id, caption, media_type, media_url,
                   like_count, comments_count, posted_at, fetched_at
            FROM instagram_posts
            WHERE account_id = $1
              AND posted_at >= $2
              AND posted_at < $3
            ORDER BY (like_count + comments_count) DESC, posted_at DESC, ig_post_id DESC
            LIMIT 1
            ",
        )
        .bind(account_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        row.map_or_else(
            || Ok(None),
            |row| Ok(Some(Self::row_to_instagram_post(&row)?)),
        )
    }

    fn row_to_instagram_post(row: &sqlx::sqlite::SqliteRow) -> Result<InstagramPost> {
        let id_str: String = row.get("id");
        let account_id_str: String = row.get("account_id");

        Ok(InstagramPost {
            id: Uuid::parse_str(&id_str)?,
            ig_post_id: row.get("ig_post_id"),
            account_id: Uuid::parse_str(&account_id_str)?,
            caption: row.get("caption"),
            media_type: row.get("media_type"),
            media_url: row.get("media_url"),
            like_count: row.get("like_count"),
            comments_count: row.get("comments_count"),
            posted_at: row.get("posted_at"),
            fetched_at: row.get("fetched_at"),
        })
    }
}
