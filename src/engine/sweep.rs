// ABOUTME: Custom badge sweeps: evaluate every not-yet-held predicate and award exactly once
// ABOUTME: Failed external lookups soft-fail to not-met for the affected badges only
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Badge sweeps.
//!
//! A sweep re-evaluates every custom badge the user does not yet hold,
//! typically after login or a milestone event. Sweeps are fully idempotent:
//! held badges are never re-evaluated, and the `(user_id, badge_id)` key in
//! storage rejects duplicates even across racing sweeps. No experience
//! attaches to custom badges.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::UserLocks;
use crate::badges::{BadgeContext, BadgeRegistry, ExternalLookups};
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{BadgeAward, ProfileAccount, SweptBadge};

/// Evaluates custom badge predicates and awards matching badges.
#[derive(Clone)]
pub struct BadgeEvaluator {
    database: Database,
    registry: Arc<BadgeRegistry>,
    lookups: Arc<dyn ExternalLookups>,
    locks: UserLocks,
}

impl BadgeEvaluator {
    /// Create an evaluator over the given storage, registry, and lookups.
    #[must_use]
    pub fn new(
        database: Database,
        registry: Arc<BadgeRegistry>,
        lookups: Arc<dyn ExternalLookups>,
        locks: UserLocks,
    ) -> Self {
        Self {
            database,
            registry,
            lookups,
            locks,
        }
    }

    /// Sweep all custom badges for one user, returning the newly awarded
    /// ones.
    ///
    /// Never fails the caller: an unknown user, a failed lookup, or a
    /// storage error all degrade to fewer (or zero) awards this pass, each
    /// reported to the log. Re-running a sweep is always safe.
    pub async fn sweep(&self, user_id: Uuid) -> Vec<SweptBadge> {
        let _guard = self.locks.acquire(user_id).await;

        match self.sweep_inner(user_id).await {
            Ok(awarded) => awarded,
            Err(e) => {
                error!(%user_id, error = %e, "badge sweep failed");
                Vec::new()
            }
        }
    }

    async fn sweep_inner(&self, user_id: Uuid) -> AppResult<Vec<SweptBadge>> {
        let Some(account) = self.database.get_profile(user_id).await? else {
            warn!(%user_id, "badge sweep for unknown user, ignoring");
            return Ok(Vec::new());
        };

        let held: HashSet<String> = self
            .database
            .list_badges(user_id)
            .await?
            .into_iter()
            .map(|b| b.badge_id)
            .collect();

        let context = self.collect_context(&account, held.len() as i64).await?;
        let mut awarded = Vec::new();

        for badge in self.registry.iter() {
            if held.contains(badge.id) {
                continue;
            }
            if !(badge.predicate)(&account, &context) {
                continue;
            }

            let award = BadgeAward {
                badge_id: badge.id.to_string(),
                name: badge.name.to_string(),
                icon: badge.icon.to_string(),
                rarity: badge.rarity,
                description: badge.description.to_string(),
                earned_at: context.now,
            };
            match self.database.append_badge(user_id, &award).await {
                Ok(true) => {
                    info!(%user_id, badge_id = %badge.id, rarity = %badge.rarity, "custom badge awarded");
                    awarded.push(SweptBadge {
                        badge_id: award.badge_id,
                        name: award.name,
                        icon: award.icon,
                        rarity: award.rarity,
                    });
                }
                // Raced with another sweep; the badge exists, nothing to report
                Ok(false) => {}
                Err(e) => {
                    warn!(%user_id, badge_id = %badge.id, error = %e, "badge append failed, skipping");
                }
            }
        }

        Ok(awarded)
    }

    /// Gather everything predicates may consult into one snapshot. Each
    /// external lookup soft-fails independently: the badges needing it
    /// simply stay locked this pass.
    async fn collect_context(
        &self,
        account: &ProfileAccount,
        badge_count: i64,
    ) -> AppResult<BadgeContext> {
        let user_id = account.user_id;
        let summary = self.database.progress_summary(user_id).await?;

        let team_count = match self.lookups.team_count_for_user(user_id).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(%user_id, error = %e, "team count lookup failed");
                None
            }
        };
        let captains_top_team = match self.lookups.captains_top_team(user_id).await {
            Ok(flag) => Some(flag),
            Err(e) => {
                warn!(%user_id, error = %e, "team captain lookup failed");
                None
            }
        };
        let global_rank = match self.lookups.global_rank(user_id).await {
            Ok(rank) => Some(rank),
            Err(e) => {
                warn!(%user_id, error = %e, "global rank lookup failed");
                None
            }
        };
        let total_users = match self.lookups.total_users().await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(%user_id, error = %e, "total user lookup failed");
                None
            }
        };
        let registration_rank = match self.database.registration_rank(user_id).await {
            Ok(rank) => rank,
            Err(e) => {
                warn!(%user_id, error = %e, "registration rank lookup failed");
                None
            }
        };

        Ok(BadgeContext {
            now: self.lookups.now(),
            team_count,
            captains_top_team,
            global_rank,
            total_users,
            registration_rank,
            achievements_total: summary.total,
            achievements_completed: summary.completed,
            badge_count,
        })
    }
}
