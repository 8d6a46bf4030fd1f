// ABOUTME: Progress record persistence with monotonic updates and conditional completion
// ABOUTME: The composite primary key and guarded UPDATE carry the idempotency guarantees
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Database;
use crate::models::{ProgressRecord, ProgressSummary};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the progress table.
    pub(super) async fn migrate_progress(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS achievement_progress (
                user_id TEXT NOT NULL,
                achievement_id TEXT NOT NULL,
                progress INTEGER NOT NULL DEFAULT 0,
                completed BOOLEAN NOT NULL DEFAULT 0,
                completed_at DATETIME,
                PRIMARY KEY (user_id, achievement_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_progress_user ON achievement_progress(user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a batch of progress records inside one transaction.
    ///
    /// Conflicting rows are left untouched (`ON CONFLICT DO NOTHING`), so a
    /// retried bootstrap never duplicates or clobbers existing progress.
    /// Returns the number of rows actually inserted.
    pub async fn insert_progress_batch(&self, records: &[ProgressRecord]) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0_i64;

        for record in records {
            let result = sqlx::query(
                r"
                INSERT INTO achievement_progress
                    (user_id, achievement_id, progress, completed, completed_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, achievement_id) DO NOTHING
                ",
            )
            .bind(record.user_id.to_string())
            .bind(&record.achievement_id)
            .bind(record.progress)
            .bind(record.completed)
            .bind(record.completed_at)
            .execute(&mut *tx)
            .await?;
            inserted += i64::try_from(result.rows_affected()).unwrap_or(0);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Fetch one progress record.
    pub async fn get_progress(
        &self,
        user_id: Uuid,
        achievement_id: &str,
    ) -> Result<Option<ProgressRecord>> {
        let row = sqlx::query(
            r"
            SELECT user_id, achievement_id, progress, completed, completed_at
            FROM achievement_progress
            WHERE user_id = $1 AND achievement_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(achievement_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_progress(&row)).transpose()
    }

    /// All progress records for a user. Ordering by catalog declaration
    /// order is applied above this layer, where the catalog is known.
    pub async fn list_progress(&self, user_id: Uuid) -> Result<Vec<ProgressRecord>> {
        let rows = sqlx::query(
            r"
            SELECT user_id, achievement_id, progress, completed, completed_at
            FROM achievement_progress WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_progress).collect()
    }

    /// Number of progress records for a user.
    pub async fn count_progress(&self, user_id: Uuid) -> Result<i64> {
        let count =
            sqlx::query_scalar("SELECT COUNT(*) FROM achievement_progress WHERE user_id = $1")
                .bind(user_id.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Raise a pending record's progress to `value`, never lowering it.
    ///
    /// Completed records are terminal and are left untouched.
    pub async fn advance_progress(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        value: i64,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE achievement_progress
            SET progress = MAX(progress, $3)
            WHERE user_id = $1 AND achievement_id = $2 AND completed = 0
            ",
        )
        .bind(user_id.to_string())
        .bind(achievement_id)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Atomically complete a record if and only if it is still pending.
    ///
    /// Returns `true` when this call performed the transition. Two racing
    /// callers cannot both observe `true`; this is the storage-level
    /// at-most-once completion guard.
    pub async fn complete_if_pending(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        progress: i64,
        completed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE achievement_progress
            SET progress = MAX(progress, $3), completed = 1, completed_at = $4
            WHERE user_id = $1 AND achievement_id = $2 AND completed = 0
            ",
        )
        .bind(user_id.to_string())
        .bind(achievement_id)
        .bind(progress)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Completed/total counts for the progress-bar UI.
    pub async fn progress_summary(&self, user_id: Uuid) -> Result<ProgressSummary> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(completed), 0) AS completed
            FROM achievement_progress WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(ProgressSummary {
            completed: row.get("completed"),
            total: row.get("total"),
        })
    }

    fn row_to_progress(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressRecord> {
        let user_id: String = row.get("user_id");
        Ok(ProgressRecord {
            user_id: Uuid::parse_str(&user_id)?,
            achievement_id: row.get("achievement_id"),
            progress: row.get("progress"),
            completed: row.get("completed"),
            completed_at: row.get::<Option<DateTime<Utc>>, _>("completed_at"),
        })
    }
}
