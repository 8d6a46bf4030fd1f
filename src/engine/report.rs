// ABOUTME: Activity event evaluation: threshold checks, rewards, and compound achievements
// ABOUTME: Completion is at-most-once per (user, achievement) via the conditional storage update
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The heart of the engine: [`AchievementEngine::report_activity`].
//!
//! Callers report lifetime cumulative counts, never deltas, after updating
//! the account's own counters. Evaluation failures degrade to "no unlocks
//! this call" so the caller's primary operation (sending a chat, logging a
//! run) always completes; only an unknown user is a hard error.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::UserLocks;
use crate::catalog::{AchievementDefinition, Catalog, Category};
use crate::constants::{special_ids, DEDICATED_SESSION_TARGET, HEALTH_GURU_LEVEL};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    BadgeAward, ProfileAccount, ProgressRecord, ProgressSummary, UnlockedAchievement,
};

/// Evaluates activity events against the catalog and awards achievements.
#[derive(Clone)]
pub struct AchievementEngine {
    database: Database,
    catalog: Arc<Catalog>,
    locks: UserLocks,
}

impl AchievementEngine {
    /// Create an engine over the given storage and catalog.
    #[must_use]
    pub const fn new(database: Database, catalog: Arc<Catalog>, locks: UserLocks) -> Self {
        Self {
            database,
            catalog,
            locks,
        }
    }

    /// Report an activity event and collect newly completed achievements.
    ///
    /// `cumulative_count` is the caller's current lifetime total for the
    /// category. Records already completed are terminal and never
    /// re-awarded. After the category pass, compound achievements
    /// (completionist, dedicated, health guru) are evaluated from current
    /// account state in that fixed order.
    ///
    /// Unknown categories and negative counts are absorbed as no-ops, and
    /// storage failures mid-evaluation degrade to the unlocks gathered so
    /// far; this call must never abort the caller's primary operation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user has no profile account.
    pub async fn report_activity(
        &self,
        user_id: Uuid,
        category: Category,
        cumulative_count: i64,
    ) -> AppResult<Vec<UnlockedAchievement>> {
        if category == Category::Special {
            debug!(%user_id, "special achievements are not event-driven, ignoring report");
            return Ok(Vec::new());
        }
        if cumulative_count < 0 {
            warn!(%user_id, %category, cumulative_count, "negative cumulative count, ignoring");
            return Ok(Vec::new());
        }

        let _guard = self.locks.acquire(user_id).await;

        let account = match self.database.get_profile(user_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return Err(AppError::not_found("profile").with_user_id(user_id)),
            Err(e) => {
                error!(%user_id, error = %e, "profile load failed, skipping achievement checks");
                return Ok(Vec::new());
            }
        };

        let mut unlocked = Vec::new();

        if let Err(e) = self
            .evaluate_category(user_id, category, cumulative_count, &mut unlocked)
            .await
        {
            error!(%user_id, %category, error = %e, "category evaluation failed");
        }

        // Reload so compound checks see experience granted above; fall back
        // to the pre-event snapshot if the reload fails.
        let account = match self.database.get_profile(user_id).await {
            Ok(Some(fresh)) => fresh,
            Ok(None) | Err(_) => account,
        };
        if let Err(e) = self.evaluate_compound(&account, &mut unlocked).await {
            error!(%user_id, error = %e, "compound evaluation failed");
        }

        Ok(unlocked)
    }

    /// Report an activity event with a raw category string.
    ///
    /// Unrecognized categories are logged and absorbed as an empty unlock
    /// list, matching the soft-fail contract for callers that forward event
    /// payloads verbatim.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user has no profile account.
    pub async fn report_activity_raw(
        &self,
        user_id: Uuid,
        category: &str,
        cumulative_count: i64,
    ) -> AppResult<Vec<UnlockedAchievement>> {
        match category.parse::<Category>() {
            Ok(parsed) => {
                self.report_activity(user_id, parsed, cumulative_count)
                    .await
            }
            Err(e) => {
                warn!(%user_id, category, error = %e, "unrecognized category, ignoring report");
                Ok(Vec::new())
            }
        }
    }

    /// Manually complete a single pending achievement, with the usual
    /// reward path. Intended for operator tooling.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, achievement id, or missing progress
    /// record; `Conflict` when the achievement is already completed.
    pub async fn award_manual(
        &self,
        user_id: Uuid,
        achievement_id: &str,
    ) -> AppResult<UnlockedAchievement> {
        let _guard = self.locks.acquire(user_id).await;

        self.database
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("profile").with_user_id(user_id))?;
        let definition = self
            .catalog
            .get(achievement_id)
            .ok_or_else(|| AppError::not_found(format!("achievement '{achievement_id}'")))?;
        let record = self
            .database
            .get_progress(user_id, achievement_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("progress for '{achievement_id}'")))?;
        if record.completed {
            return Err(
                AppError::conflict(format!("achievement '{achievement_id}' already completed"))
                    .with_user_id(user_id),
            );
        }

        let mut unlocked = Vec::new();
        self.grant(user_id, definition, definition.target, &mut unlocked)
            .await?;
        unlocked.pop().ok_or_else(|| {
            AppError::conflict(format!("achievement '{achievement_id}' already completed"))
                .with_user_id(user_id)
        })
    }

    /// All progress records for a user, in catalog declaration order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user.
    pub async fn list_progress(&self, user_id: Uuid) -> AppResult<Vec<ProgressRecord>> {
        self.database
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("profile").with_user_id(user_id))?;
        let mut records = self.database.list_progress(user_id).await?;

        // Catalog order; anything unknown to the catalog sorts last
        let position = |record: &ProgressRecord| {
            self.catalog
                .iter()
                .position(|d| d.id == record.achievement_id)
                .unwrap_or(usize::MAX)
        };
        records.sort_by_key(position);
        Ok(records)
    }

    /// Completed/total counts for the progress-bar UI.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user.
    pub async fn progress_summary(&self, user_id: Uuid) -> AppResult<ProgressSummary> {
        self.database
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("profile").with_user_id(user_id))?;
        Ok(self.database.progress_summary(user_id).await?)
    }

    async fn evaluate_category(
        &self,
        user_id: Uuid,
        category: Category,
        cumulative_count: i64,
        unlocked: &mut Vec<UnlockedAchievement>,
    ) -> AppResult<()> {
        for definition in self.catalog.for_category(category) {
            let Some(record) = self.database.get_progress(user_id, &definition.id).await? else {
                warn!(
                    %user_id,
                    achievement_id = %definition.id,
                    "no progress record, was this user bootstrapped?"
                );
                continue;
            };
            if record.completed {
                continue;
            }

            if cumulative_count >= definition.target {
                self.grant(user_id, definition, cumulative_count, unlocked)
                    .await?;
            } else {
                self.database
                    .advance_progress(user_id, &definition.id, cumulative_count)
                    .await?;
            }
        }
        Ok(())
    }

    /// Compound achievements read total counters, not the event's category,
    /// and run on every report. The completed short-circuit keeps the
    /// redundant evaluation cheap.
    async fn evaluate_compound(
        &self,
        account: &ProfileAccount,
        unlocked: &mut Vec<UnlockedAchievement>,
    ) -> AppResult<()> {
        let user_id = account.user_id;
        let checks: [(&str, bool, i64); 3] = [
            (
                special_ids::COMPLETIONIST,
                account.used_all_features(),
                account.total_sessions().min(4),
            ),
            (
                special_ids::DEDICATED,
                account.total_sessions() >= DEDICATED_SESSION_TARGET,
                account.total_sessions(),
            ),
            (
                special_ids::HEALTH_GURU,
                account.level >= HEALTH_GURU_LEVEL,
                account.level,
            ),
        ];

        for (id, condition_met, progress_value) in checks {
            if !condition_met {
                continue;
            }
            let Some(definition) = self.catalog.get(id) else {
                warn!(achievement_id = %id, "compound achievement missing from catalog");
                continue;
            };
            match self.database.get_progress(user_id, id).await? {
                Some(record) if !record.completed => {
                    self.grant(user_id, definition, progress_value.max(definition.target), unlocked)
                        .await?;
                }
                Some(_) => {}
                None => {
                    warn!(%user_id, achievement_id = %id, "no progress record for compound check");
                }
            }
        }
        Ok(())
    }

    /// One-way completion: conditional update, experience deposit, badge.
    ///
    /// A lost race on the conditional update means another call already
    /// completed the record; nothing is awarded here in that case.
    async fn grant(
        &self,
        user_id: Uuid,
        definition: &AchievementDefinition,
        progress_value: i64,
        unlocked: &mut Vec<UnlockedAchievement>,
    ) -> AppResult<()> {
        let now = Utc::now();
        let transitioned = self
            .database
            .complete_if_pending(user_id, &definition.id, progress_value, now)
            .await?;
        if !transitioned {
            return Ok(());
        }

        let level_up = self
            .database
            .add_experience(user_id, definition.reward.experience_points)
            .await?;

        let badge = BadgeAward {
            badge_id: definition.id.clone(),
            name: definition.title.clone(),
            icon: definition.reward.badge_icon.clone(),
            rarity: definition.badge_rarity(),
            description: definition.description.clone(),
            earned_at: now,
        };
        self.database.append_badge(user_id, &badge).await?;

        info!(
            %user_id,
            achievement_id = %definition.id,
            title = %definition.title,
            xp = definition.reward.experience_points,
            leveled_up = level_up.leveled_up,
            "achievement unlocked"
        );

        unlocked.push(UnlockedAchievement {
            achievement_id: definition.id.clone(),
            title: definition.title.clone(),
            icon: definition.icon.clone(),
            experience_points: definition.reward.experience_points,
            new_level: level_up.leveled_up.then_some(level_up.new_level),
        });
        Ok(())
    }
}
