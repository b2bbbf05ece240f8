// ABOUTME: Instagram account vault operations for per-user credential storage
// ABOUTME: Enforces ig_user_id uniqueness via upsert and cascades post deletion
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::Database;
use crate::models::{InstagramAccount, NewInstagramAccount};
use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create `instagram_accounts` table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails.
    pub(super) async fn migrate_instagram_accounts(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS instagram_accounts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                ig_user_id TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL DEFAULT '',
                access_token TEXT NOT NULL,
                token_expires_at DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_instagram_accounts_user ON instagram_accounts(user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or update an account keyed by `ig_user_id`
    ///
    /// Relinking an already-known Instagram account updates the existing row
    /// (handle, credential, expiry) instead of creating a duplicate. Returns
    /// the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn upsert_instagram_account(
        &self,
        account: &NewInstagramAccount,
    ) -> Result<InstagramAccount> {
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO instagram_accounts (
                id, user_id, ig_user_id, username, access_token,
                token_expires_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (ig_user_id)
            DO UPDATE SET
                username = EXCLUDED.username,
                access_token = EXCLUDED.access_token,
                token_expires_at = EXCLUDED.token_expires_at,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(account.user_id.to_string())
        .bind(&account.ig_user_id)
        .bind(&account.username)
        .bind(&account.access_token)
        .bind(account.token_expires_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r"
            SELECT id, user_id, ig_user_id, username, access_token,
                   token_expires_at, created_at, updated_at
            FROM instagram_accounts
            WHERE ig_user_id = $1
            ",
        )
        .bind(&account.ig_user_id)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_instagram_account(&row)
    }

    /// Get the account linked by a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_instagram_account_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<InstagramAccount>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, ig_user_id, username, access_token,
                   token_expires_at, created_at, updated_at
            FROM instagram_accounts
            WHERE user_id = $1
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map_or_else(
            || Ok(None),
            |row| Ok(Some(Self::row_to_instagram_account(&row)?)),
        )
    }

    /// Get an account by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_instagram_account_by_id(&self, id: Uuid) -> Result<Option<InstagramAccount>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, ig_user_id, username, access_token,
                   token_expires_at, created_at, updated_at
            FROM instagram_accounts
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map_or_else(
            || Ok(None),
            |row| Ok(Some(Self::row_to_instagram_account(&row)?)),
        )
    }

    /// Delete a user's linked account and all of its posts
    ///
    /// The account exclusively owns its posts, so both are removed in one
    /// transaction. Deleting for a user with no linked account is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn delete_instagram_account_by_user(&self, user_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            DELETE FROM instagram_posts
            WHERE account_id IN (
                SELECT id FROM instagram_accounts WHERE user_id = $1
            )
            ",
        )
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM instagram_accounts WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    fn row_to_instagram_account(row: &sqlx::sqlite::SqliteRow) -> Result<InstagramAccount> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");

        Ok(InstagramAccount {
            id: Uuid::parse_str(&id_str)?,
            user_id: Uuid::parse_str(&user_id_str)?,
            ig_user_id: row.get("ig_user_id"),
            username: row.get("username"),
            access_token: row.get("access_token"),
            token_expires_at: row.get("token_expires_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
