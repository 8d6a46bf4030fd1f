// ABOUTME: First-time initialization of a user's achievement set with bootstrap-time grants
// ABOUTME: Idempotent via the composite unique key; pioneer/early-adopter grants batch one XP deposit
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User bootstrap: seed every catalog achievement for a new account.
//!
//! Invoked once per user, typically at account verification time. The
//! existence fast-path makes repeat calls cheap, but the real duplicate
//! protection is the `(user_id, achievement_id)` key in storage, so a retry
//! after a partial failure is always safe.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::UserLocks;
use crate::catalog::Catalog;
use crate::constants::{special_ids, PIONEER_USER_LIMIT};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{BadgeAward, BootstrapSummary, ProgressRecord};

/// Seeds new users with their full achievement set.
#[derive(Clone)]
pub struct Bootstrapper {
    database: Database,
    catalog: Arc<Catalog>,
    locks: UserLocks,
}

impl Bootstrapper {
    /// Create a bootstrapper over the given storage and catalog.
    #[must_use]
    pub const fn new(database: Database, catalog: Arc<Catalog>, locks: UserLocks) -> Self {
        Self {
            database,
            catalog,
            locks,
        }
    }

    /// Initialize the achievement set for a user.
    ///
    /// Creates one pending progress record per catalog definition.
    /// Bootstrap-time grants are evaluated once, against a user-count
    /// snapshot taken here: `pioneer` for the first 100 registered users
    /// and `early_adopter` for everyone. Granted records are created
    /// already completed, their badges appended, and their combined reward
    /// deposited as a single experience batch with one level evaluation.
    ///
    /// Idempotent: when records already exist the call is a no-op that
    /// reports the existing count.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user has no profile account. Storage
    /// failures propagate; the transactional batch insert guarantees no
    /// partial record set is left behind.
    pub async fn initialize(&self, user_id: Uuid) -> AppResult<BootstrapSummary> {
        let _guard = self.locks.acquire(user_id).await;

        self.database
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("profile").with_user_id(user_id))?;

        // Fast path only; the unique key is the actual guarantee
        let existing = self.database.count_progress(user_id).await?;
        if existing > 0 {
            info!(%user_id, existing, "achievements already initialized, skipping");
            return Ok(BootstrapSummary {
                created: existing,
                bonus_experience: 0,
            });
        }

        let user_count = self.database.user_count().await?;
        let now = Utc::now();
        let mut records = Vec::with_capacity(self.catalog.len());
        let mut granted = Vec::new();
        let mut bonus_experience = 0_i64;

        for definition in self.catalog.iter() {
            let grant_now = match definition.id.as_str() {
                special_ids::EARLY_ADOPTER => true,
                special_ids::PIONEER => user_count <= PIONEER_USER_LIMIT,
                _ => false,
            };

            if grant_now {
                bonus_experience += definition.reward.experience_points;
                granted.push(BadgeAward {
                    badge_id: definition.id.clone(),
                    name: definition.title.clone(),
                    icon: definition.reward.badge_icon.clone(),
                    rarity: definition.badge_rarity(),
                    description: definition.description.clone(),
                    earned_at: now,
                });
                records.push(ProgressRecord {
                    user_id,
                    achievement_id: definition.id.clone(),
                    progress: definition.target,
                    completed: true,
                    completed_at: Some(now),
                });
            } else {
                records.push(ProgressRecord {
                    user_id,
                    achievement_id: definition.id.clone(),
                    progress: 0,
                    completed: false,
                    completed_at: None,
                });
            }
        }

        let created = self.database.insert_progress_batch(&records).await?;

        for badge in &granted {
            if !self.database.append_badge(user_id, badge).await? {
                // Lost to a concurrent bootstrap; the other call owns the grant
                warn!(%user_id, badge_id = %badge.badge_id, "bootstrap badge already present");
            }
        }

        // Single batched deposit, one level evaluation
        if created > 0 && bonus_experience > 0 {
            let level_up = self
                .database
                .add_experience(user_id, bonus_experience)
                .await?;
            if level_up.leveled_up {
                info!(%user_id, new_level = level_up.new_level, "bootstrap grants caused a level-up");
            }
        }

        info!(
            %user_id,
            created,
            bonus_experience,
            user_count,
            "achievements initialized"
        );

        Ok(BootstrapSummary {
            created,
            bonus_experience: if created > 0 { bonus_experience } else { 0 },
        })
    }
}
