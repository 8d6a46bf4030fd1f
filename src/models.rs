// ABOUTME: Core data models for profiles, progress records, and badge awards
// ABOUTME: ProfileAccount, ActivityStats, ProgressRecord, BadgeAward, and engine result types
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model for the achievement engine.
//!
//! A [`ProfileAccount`] is the per-user mutable aggregate (experience, level,
//! category counters). One [`ProgressRecord`] exists per user x achievement,
//! and [`BadgeAward`] entries form the user's append-only badge list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::level_for_experience;
use crate::errors::AppError;

/// Per-user mutable aggregate: experience, level, counters, and timestamps.
///
/// `level` is derived from `experience_total` and recomputed on every
/// mutation; it is never independently set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAccount {
    /// Stable user identifier
    pub user_id: Uuid,
    /// Lifetime experience points; only ever increases
    pub experience_total: i64,
    /// Derived level: `floor(experience_total / 100) + 1`
    pub level: i64,
    /// Per-category cumulative counters maintained by activity collaborators
    pub stats: ActivityStats,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last reported activity
    pub last_active: DateTime<Utc>,
}

impl ProfileAccount {
    /// Create a fresh account with zeroed counters at level 1.
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            experience_total: 0,
            level: 1,
            stats: ActivityStats::default(),
            created_at: now,
            last_active: now,
        }
    }

    /// Total sessions across the four main features; drives the dedicated
    /// and completionist compound achievements.
    #[must_use]
    pub const fn total_sessions(&self) -> i64 {
        self.stats.total_chats
            + self.stats.total_reports
            + self.stats.total_vision_analyses
            + self.stats.total_symptom_checks
    }

    /// Whether all four main features have been used at least once.
    #[must_use]
    pub const fn used_all_features(&self) -> bool {
        self.stats.total_chats > 0
            && self.stats.total_reports > 0
            && self.stats.total_vision_analyses > 0
            && self.stats.total_symptom_checks > 0
    }

    /// Recompute the derived level from the current experience total.
    pub fn recompute_level(&mut self) {
        self.level = level_for_experience(self.experience_total);
    }
}

/// Cumulative activity counters for one user.
///
/// External collaborators (chat, report, vision, symptom, run, team modules)
/// increment these before reporting the new cumulative value to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityStats {
    /// Chat sessions completed
    pub total_chats: i64,
    /// Medical reports analyzed
    pub total_reports: i64,
    /// Vision (image) analyses completed
    pub total_vision_analyses: i64,
    /// Symptom checks completed
    pub total_symptom_checks: i64,
    /// Current consecutive-day usage streak
    pub streak_days: i64,
    /// Challenges completed
    pub total_challenges: i64,
    /// Team members helped (community counter)
    pub helped_users: i64,
    /// Motivation reactions sent to other runners
    pub motivations: i64,
    /// Users invited to the platform
    pub referrals: i64,
    /// Running-specific counters
    pub running: RunningStats,
}

/// Running-specific cumulative counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningStats {
    /// Runs completed
    pub total_runs: i64,
    /// Lifetime distance in kilometers
    pub total_distance_km: f64,
    /// Map territories captured
    pub total_territories: i64,
    /// Best recorded speed in km/h
    pub best_speed_kmh: f64,
}

/// One user's progress toward one catalog achievement.
///
/// `progress` is monotonically non-decreasing and `completed` transitions
/// false to true exactly once; `completed_at` is immutable once set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Owning user
    pub user_id: Uuid,
    /// Catalog achievement id
    pub achievement_id: String,
    /// Current cumulative progress value
    pub progress: i64,
    /// Terminal completion flag
    pub completed: bool,
    /// Set exactly once, when `completed` flips to true
    pub completed_at: Option<DateTime<Utc>>,
}

/// Badge rarity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    /// Starter-tier badges
    Common,
    /// Activity-tier badges
    Uncommon,
    /// Elite-tier badges
    Rare,
    /// Top-tier badges
    Legendary,
}

impl Rarity {
    /// String form used for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Legendary => "legendary",
        }
    }
}

impl Display for Rarity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            "legendary" => Ok(Self::Legendary),
            other => Err(AppError::invalid_input(format!("invalid rarity: {other}"))),
        }
    }
}

/// One entry in a user's badge list. Sourced either from a completed catalog
/// achievement or from a custom badge predicate; unique per user by
/// `badge_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeAward {
    /// Stable badge identity (achievement id or custom badge id)
    pub badge_id: String,
    /// Display name
    pub name: String,
    /// Display icon
    pub icon: String,
    /// Rarity tier
    pub rarity: Rarity,
    /// Display description
    pub description: String,
    /// Award timestamp
    pub earned_at: DateTime<Utc>,
}

/// Outcome of an experience deposit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelUp {
    /// True when the deposit pushed the account past a level boundary
    pub leveled_up: bool,
    /// Level after the deposit
    pub new_level: i64,
}

/// A newly completed achievement, as surfaced to the triggering caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    /// Catalog achievement id
    pub achievement_id: String,
    /// Display title
    pub title: String,
    /// Display icon
    pub icon: String,
    /// Experience points granted
    pub experience_points: i64,
    /// New level when the grant caused a level-up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<i64>,
}

/// A custom badge awarded by a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweptBadge {
    /// Custom badge id
    pub badge_id: String,
    /// Display name
    pub name: String,
    /// Display icon
    pub icon: String,
    /// Rarity tier
    pub rarity: Rarity,
}

/// Result of bootstrapping a user's achievement set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BootstrapSummary {
    /// Number of progress records present after the call. For a repeated
    /// call this reports the existing count and nothing is created.
    pub created: i64,
    /// Experience granted by immediate bootstrap-time achievements,
    /// deposited as a single batch
    pub bonus_experience: i64,
}

/// Completed/total counts for the progress-bar UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProgressSummary {
    /// Achievements completed
    pub completed: i64,
    /// Achievements tracked
    pub total: i64,
}

impl ProgressSummary {
    /// Completion percentage, rounded to the nearest whole percent.
    #[must_use]
    pub fn percentage(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.completed as f64 / self.total as f64 * 100.0).round() as i64
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_level_one() {
        let account = ProfileAccount::new(Uuid::new_v4());
        assert_eq!(account.experience_total, 0);
        assert_eq!(account.level, 1);
        assert_eq!(account.total_sessions(), 0);
        assert!(!account.used_all_features());
    }

    #[test]
    fn test_recompute_level() {
        let mut account = ProfileAccount::new(Uuid::new_v4());
        account.experience_total = 250;
        account.recompute_level();
        assert_eq!(account.level, 3);
    }

    #[test]
    fn test_used_all_features_requires_every_counter() {
        let mut account = ProfileAccount::new(Uuid::new_v4());
        account.stats.total_chats = 1;
        account.stats.total_reports = 1;
        account.stats.total_vision_analyses = 1;
        assert!(!account.used_all_features());
        account.stats.total_symptom_checks = 1;
        assert!(account.used_all_features());
    }

    #[test]
    fn test_rarity_round_trip() {
        for rarity in [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Legendary,
        ] {
            assert_eq!(Rarity::from_str(rarity.as_str()).unwrap(), rarity);
        }
        assert!(Rarity::from_str("mythic").is_err());
    }

    #[test]
    fn test_progress_summary_percentage() {
        let summary = ProgressSummary {
            completed: 2,
            total: 3,
        };
        assert_eq!(summary.percentage(), 67);
        let empty = ProgressSummary {
            completed: 0,
            total: 0,
        };
        assert_eq!(empty.percentage(), 0);
    }

    #[test]
    fn test_stats_deserialize_with_missing_fields() {
        // Older stored profiles may predate newer counters
        let stats: ActivityStats = serde_json::from_str(r#"{"total_chats": 3}"#).unwrap();
        assert_eq!(stats.total_chats, 3);
        assert_eq!(stats.total_symptom_checks, 0);
        assert_eq!(stats.running.total_runs, 0);
    }
}
