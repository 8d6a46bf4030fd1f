// ABOUTME: SQLite-backed storage for profiles, progress records, and badge awards
// ABOUTME: Owns the connection pool and runs schema migrations at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Database Management
//!
//! Storage layer for the achievement engine. The schema is intentionally
//! small: one `profiles` row per user, one `achievement_progress` row per
//! user x achievement, and an append-only `profile_badges` table. The
//! composite primary keys on progress and badges are the real idempotency
//! guarantee; existence checks above this layer are fast-path optimizations
//! only.

mod profiles;
mod progress;

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use tracing::debug;

/// Database manager for achievement state.
///
/// Cheap to clone; the pool is shared.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") && !in_memory {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        // An in-memory database lives and dies with its connection, so the
        // pool must hold exactly one and never recycle it.
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&connection_options)
                .await?
        } else {
            SqlitePool::connect(&connection_options).await?
        };
        let db = Self { pool };
        db.migrate().await?;
        debug!(url = %database_url, "database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations.
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails.
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_profiles().await?;
        self.migrate_progress().await?;
        Ok(())
    }
}
