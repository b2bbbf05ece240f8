// ABOUTME: Period-over-period growth statistics computed on demand from stored posts
// ABOUTME: Aggregates, baseline-safe trends, best post selection, and the narrative message
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Growth Statistics
//!
//! Computes an ephemeral statistics snapshot for one account over a
//! caller-chosen lookback period. Nothing here is persisted; every call
//! reads the current post store.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::InstagramPost;

/// Caption length kept on the best post before the `"..."` marker
const CAPTION_PREVIEW_CHARS: usize = 100;

/// A validated statistics lookback period in days
///
/// Accepted query shorthands are `7`/`week`, `14`, `30`/`month`, and `90`;
/// anything else falls back to the 30-day default rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodDays(i64);

impl PeriodDays {
    /// The default 30-day period
    pub const DEFAULT: Self = Self(30);

    /// Parse a period query value with fallback
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("7" | "week") => Self(7),
            Some("14") => Self(14),
            Some("30" | "month") => Self(30),
            Some("90") => Self(90),
            _ => Self::DEFAULT,
        }
    }

    /// The period length in days
    #[must_use]
    pub const fn days(self) -> i64 {
        self.0
    }
}

impl Default for PeriodDays {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The best-performing post of the current window
#[derive(Debug, Clone, Serialize)]
pub struct BestPost {
    /// Stored post id
    pub id: Uuid,
    /// Caption preview, truncated to 100 characters plus `"..."`
    pub caption: String,
    /// Media type
    pub media_type: String,
    /// Media URL
    pub media_url: String,
    /// Like count
    pub like_count: i64,
    /// Comment count
    pub comment_count: i64,
    /// Likes plus comments
    pub engagement: i64,
    /// Publish time
    pub posted_at: DateTime<Utc>,
}

/// Computed engagement statistics for one account and period
#[derive(Debug, Clone, Serialize)]
pub struct GrowthStats {
    /// Posts in the current window
    pub total_posts: i64,
    /// Likes in the current window
    pub total_likes: i64,
    /// Comments in the current window
    pub total_comments: i64,
    /// Likes plus comments in the current window
    pub total_engagement: i64,
    /// Likes per post, 0 when the window is empty
    pub avg_likes_per_post: f64,
    /// Comments per post, 0 when the window is empty
    pub avg_comments_per_post: f64,
    /// Engagement per post, 0 when the window is empty
    pub engagement_rate: f64,
    /// Best-performing post, absent when the window is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_post: Option<BestPost>,
    /// Percentage change of likes vs. the previous window, 0 on a zero baseline
    pub likes_trend: f64,
    /// Percentage change of comments vs. the previous window, 0 on a zero baseline
    pub comments_trend: f64,
    /// Percentage change of post count vs. the previous window, 0 on a zero baseline
    pub posting_trend: f64,
    /// Posts in the last 7 days, independent of the requested period
    pub posts_this_week: i64,
    /// Posts in the last 30 days, independent of the requested period
    pub posts_this_month: i64,
    /// The period the snapshot was computed over
    pub period_days: i64,
    /// Narrative summary of the trend
    pub message: String,
}

/// Computes growth statistics snapshots
pub struct GrowthAnalyzer {
    database: Database,
}

impl GrowthAnalyzer {
    /// Create a new analyzer
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Compute the statistics snapshot for `account_id` over `period`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] when a store read fails.
    pub async fn compute_stats(
        &self,
        account_id: Uuid,
        period: PeriodDays,
    ) -> AppResult<GrowthStats> {
        let now = Utc::now();
        let current_start = now - Duration::days(period.days());
        let previous_start = now - Duration::days(period.days() * 2);

        let current = self
            .database
            .post_window_aggregates(account_id, current_start, now)
            .await
            .map_err(AppError::database)?;
        let previous = self
            .database
            .post_window_aggregates(account_id, previous_start, current_start)
            .await
            .map_err(AppError::database)?;

        let total_engagement = current.total_likes + current.total_comments;
        let (avg_likes_per_post, avg_comments_per_post, engagement_rate) = if current.post_count > 0
        {
            let posts = current.post_count as f64;
            (
                current.total_likes as f64 / posts,
                current.total_comments as f64 / posts,
                total_engagement as f64 / posts,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        let likes_trend = trend_percent(current.total_likes, previous.total_likes);
        let comments_trend = trend_percent(current.total_comments, previous.total_comments);
        let posting_trend = trend_percent(current.post_count, previous.post_count);

        let best_post = self
            .database
            .best_post_in_window(account_id, current_start, now)
            .await
            .map_err(AppError::database)?
            .map(to_best_post);

        let posts_this_week = self
            .database
            .count_posts_since(account_id, now - Duration::days(7))
            .await
            .map_err(AppError::database)?;
        let posts_this_month = self
            .database
            .count_posts_since(account_id, now - Duration::days(30))
            .await
            .map_err(AppError::database)?;

        let message = narrative_message(current.post_count, likes_trend, posts_this_week);

        Ok(GrowthStats {
            total_posts: current.post_count,
            total_likes: current.total_likes,
            total_comments: current.total_comments,
            total_engagement,
            avg_likes_per_post,
            avg_comments_per_post,
            engagement_rate,
            best_post,
            likes_trend,
            comments_trend,
            posting_trend,
            posts_this_week,
            posts_this_month,
            period_days: period.days(),
            message,
        })
    }
}

/// Percentage change against a previous-window baseline
///
/// A zero baseline yields a flat 0% rather than an error or infinity;
/// near-zero denominators would otherwise produce misleading spikes.
fn trend_percent(current: i64, previous: i64) -> f64 {
    if previous > 0 {
        (current - previous) as f64 / previous as f64 * 100.0
    } else {
        0.0
    }
}

fn to_best_post(post: InstagramPost) -> BestPost {
    BestPost {
        id: post.id,
        caption: truncate_caption(&post.caption),
        media_type: post.media_type,
        media_url: post.media_url,
        like_count: post.like_count,
        comment_count: post.comments_count,
        engagement: post.like_count + post.comments_count,
        posted_at: post.posted_at,
    }
}

/// Truncate a caption to its first 100 characters with a `"..."` marker
fn truncate_caption(caption: &str) -> String {
    if caption.chars().count() > CAPTION_PREVIEW_CHARS {
        let mut preview: String = caption.chars().take(CAPTION_PREVIEW_CHARS).collect();
        preview.push_str("...");
        preview
    } else {
        caption.to_string()
    }
}

/// Pick the narrative message for the snapshot
///
/// An empty current window overrides everything. Otherwise the base message
/// comes from the first matching `likes_trend` band, with a posting-cadence
/// note appended for a silent or unusually busy week.
fn narrative_message(total_posts: i64, likes_trend: f64, posts_this_week: i64) -> String {
    if total_posts == 0 {
        return "No posts yet in this period. Time to share something! 📸".to_string();
    }

    let mut message = if likes_trend > 20.0 {
        "🔥 You're on fire! Engagement is way up."
    } else if likes_trend > 5.0 {
        "📈 Nice! You're growing steadily."
    } else if likes_trend > -5.0 {
        "😎 Holding steady - keep doing your thing."
    } else if likes_trend > -20.0 {
        "📉 Slight dip, but no worries - it happens."
    } else {
        "💪 Engagement is down, but consistency is key!"
    }
    .to_string();

    if posts_this_week == 0 {
        message.push_str(" Haven't posted this week though - your audience misses you!");
    } else if posts_this_week >= 5 {
        message.push_str(" You've been posting a lot - great hustle!");
    }

    message
}
