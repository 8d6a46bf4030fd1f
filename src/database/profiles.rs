// ABOUTME: Profile account persistence: experience, level, counters, and badge list
// ABOUTME: add_experience is the only write path for the experience total
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Database;
use crate::constants::level_for_experience;
use crate::errors::AppError;
use crate::models::{ActivityStats, BadgeAward, LevelUp, ProfileAccount, Rarity};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

impl Database {
    /// Create profile and badge tables.
    pub(super) async fn migrate_profiles(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                experience_total INTEGER NOT NULL DEFAULT 0,
                level INTEGER NOT NULL DEFAULT 1,
                stats TEXT NOT NULL DEFAULT '{}',
                created_at DATETIME NOT NULL,
                last_active DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS profile_badges (
                user_id TEXT NOT NULL,
                badge_id TEXT NOT NULL,
                name TEXT NOT NULL,
                icon TEXT NOT NULL,
                rarity TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                earned_at DATETIME NOT NULL,
                PRIMARY KEY (user_id, badge_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_profile_badges_user ON profile_badges(user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a new profile account.
    ///
    /// # Errors
    ///
    /// Returns a conflict error if the user already has a profile.
    pub async fn create_profile(&self, account: &ProfileAccount) -> Result<()> {
        let stats = serde_json::to_string(&account.stats)?;
        let result = sqlx::query(
            r"
            INSERT INTO profiles (user_id, experience_total, level, stats, created_at, last_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(account.user_id.to_string())
        .bind(account.experience_total)
        .bind(account.level)
        .bind(stats)
        .bind(account.created_at)
        .bind(account.last_active)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::conflict(
                format!("profile already exists for user {}", account.user_id),
            )
            .with_user_id(account.user_id)
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a profile account by user id.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<ProfileAccount>> {
        let row = sqlx::query(
            r"
            SELECT user_id, experience_total, level, stats, created_at, last_active
            FROM profiles WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_profile(&row)).transpose()
    }

    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<ProfileAccount> {
        let user_id: String = row.get("user_id");
        let stats_json: String = row.get("stats");
        let stats: ActivityStats = serde_json::from_str(&stats_json)?;
        Ok(ProfileAccount {
            user_id: Uuid::parse_str(&user_id)?,
            experience_total: row.get("experience_total"),
            level: row.get("level"),
            stats,
            created_at: row.get("created_at"),
            last_active: row.get("last_active"),
        })
    }

    /// Replace a user's activity counters and refresh `last_active`.
    ///
    /// Collaborators call this before reporting the new cumulative value to
    /// the engine. The experience total is deliberately untouched here.
    pub async fn update_stats(&self, user_id: Uuid, stats: &ActivityStats) -> Result<()> {
        let stats_json = serde_json::to_string(stats)?;
        let result = sqlx::query(
            "UPDATE profiles SET stats = $2, last_active = $3 WHERE user_id = $1",
        )
        .bind(user_id.to_string())
        .bind(stats_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("profile").with_user_id(user_id).into());
        }
        Ok(())
    }

    /// Total number of registered profiles.
    pub async fn user_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Position of this user in registration order (1 is first), or `None`
    /// for an unknown user.
    pub async fn registration_rank(&self, user_id: Uuid) -> Result<Option<i64>> {
        let rank: Option<i64> = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM profiles
            WHERE created_at <= (SELECT created_at FROM profiles WHERE user_id = $1)
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        // COUNT over an empty subquery yields 0 for unknown users
        Ok(rank.filter(|&r| r > 0))
    }

    /// Add experience to a profile and recompute the level.
    ///
    /// This is the only sanctioned path that mutates `experience_total`.
    /// A non-positive `amount` is a no-op that never reports a level-up.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user has no profile.
    pub async fn add_experience(&self, user_id: Uuid, amount: i64) -> Result<LevelUp> {
        let row = sqlx::query("SELECT experience_total, level FROM profiles WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("profile").with_user_id(user_id))?;

        let current_xp: i64 = row.get("experience_total");
        let current_level: i64 = row.get("level");

        if amount <= 0 {
            return Ok(LevelUp {
                leveled_up: false,
                new_level: current_level,
            });
        }

        let new_total = current_xp + amount;
        let new_level = level_for_experience(new_total);
        sqlx::query("UPDATE profiles SET experience_total = $2, level = $3 WHERE user_id = $1")
            .bind(user_id.to_string())
            .bind(new_total)
            .bind(new_level)
            .execute(&self.pool)
            .await?;

        Ok(LevelUp {
            leveled_up: new_level > current_level,
            new_level,
        })
    }

    /// Append a badge to a user's list.
    ///
    /// Returns `true` when the badge was inserted, `false` when the user
    /// already held it. The `(user_id, badge_id)` primary key makes this
    /// safe under retries and races.
    pub async fn append_badge(&self, user_id: Uuid, badge: &BadgeAward) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO profile_badges
                (user_id, badge_id, name, icon, rarity, description, earned_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user_id.to_string())
        .bind(&badge.badge_id)
        .bind(&badge.name)
        .bind(&badge.icon)
        .bind(badge.rarity.as_str())
        .bind(&badge.description)
        .bind(badge.earned_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All badges held by a user, oldest first.
    pub async fn list_badges(&self, user_id: Uuid) -> Result<Vec<BadgeAward>> {
        let rows = sqlx::query(
            r"
            SELECT badge_id, name, icon, rarity, description, earned_at
            FROM profile_badges WHERE user_id = $1
            ORDER BY earned_at, badge_id
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let rarity: String = row.get("rarity");
                Ok(BadgeAward {
                    badge_id: row.get("badge_id"),
                    name: row.get("name"),
                    icon: row.get("icon"),
                    rarity: Rarity::from_str(&rarity)?,
                    description: row.get("description"),
                    earned_at: row.get::<DateTime<Utc>, _>("earned_at"),
                })
            })
            .collect()
    }

    /// Number of badges held by a user.
    pub async fn badge_count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM profile_badges WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a user's profile, progress records, and badges in one
    /// transaction. This is the only path that removes progress records.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let id = user_id.to_string();
        sqlx::query("DELETE FROM achievement_progress WHERE user_id = $1")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM profile_badges WHERE user_id = $1")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
