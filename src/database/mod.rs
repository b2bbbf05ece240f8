// ABOUTME: Database management for account credentials and ingested posts
// ABOUTME: Owns the connection pool lifecycle and schema migrations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Database Management
//!
//! SQLite storage for linked accounts and their posts. The pool is created
//! explicitly at startup and closed explicitly at shutdown; nothing is
//! lazily initialized on first use.

mod accounts;
mod posts;

pub use posts::PostAggregates;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for account and post storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection pool and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or migrations fail.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails.
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_instagram_accounts().await?;
        self.migrate_instagram_posts().await?;
        Ok(())
    }

    /// Close the pool, draining in-flight connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
