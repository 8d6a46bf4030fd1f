// ABOUTME: Custom badge registry with pure predicates over account state and external lookups
// ABOUTME: Defines BadgeContext snapshots, the ExternalLookups capability, and the built-in badges
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Custom Badges
//!
//! Custom badges are independent of the threshold-driven catalog: each one
//! carries a pure predicate `fn(&ProfileAccount, &BadgeContext) -> bool`.
//! Everything a predicate could need beyond the account itself (team counts,
//! global rank, wall clock) is gathered once per sweep into a
//! [`BadgeContext`] through the injected [`ExternalLookups`] capability.
//! A lookup that fails leaves its field `None`, and predicates that need it
//! evaluate as not-met for that sweep only.
//!
//! No experience attaches to custom badges; the award is badge-only.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use std::collections::HashMap;
use uuid::Uuid;

use crate::constants::{ELITE_PERCENTILE, FOUNDER_USER_LIMIT};
use crate::errors::{AppError, AppResult};
use crate::models::{ProfileAccount, Rarity};

/// Injected capability object for cross-model lookups used by badge
/// predicates. Implemented by the embedding service; predicates never touch
/// persistence directly.
#[async_trait]
pub trait ExternalLookups: Send + Sync {
    /// Number of teams the user belongs to.
    async fn team_count_for_user(&self, user_id: Uuid) -> anyhow::Result<i64>;

    /// Whether the user captains a team currently in the global top ten.
    async fn captains_top_team(&self, user_id: Uuid) -> anyhow::Result<bool>;

    /// The user's rank on the global experience leaderboard (1 is best).
    async fn global_rank(&self, user_id: Uuid) -> anyhow::Result<i64>;

    /// Total registered users.
    async fn total_users(&self) -> anyhow::Result<i64>;

    /// Current wall-clock time. Injectable so date-window badges are
    /// testable.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Lookups implementation for deployments without team or leaderboard
/// collaborators; every lookup reports unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalLookups;

#[async_trait]
impl ExternalLookups for NoExternalLookups {
    async fn team_count_for_user(&self, _user_id: Uuid) -> anyhow::Result<i64> {
        anyhow::bail!("team lookups not configured")
    }

    async fn captains_top_team(&self, _user_id: Uuid) -> anyhow::Result<bool> {
        anyhow::bail!("team lookups not configured")
    }

    async fn global_rank(&self, _user_id: Uuid) -> anyhow::Result<i64> {
        anyhow::bail!("leaderboard lookups not configured")
    }

    async fn total_users(&self) -> anyhow::Result<i64> {
        anyhow::bail!("user count lookup not configured")
    }
}

/// Snapshot of everything badge predicates may consult besides the account.
///
/// Built once per sweep. `None` means the corresponding lookup failed or is
/// not configured; predicates requiring it must return false.
#[derive(Debug, Clone)]
pub struct BadgeContext {
    /// Sweep timestamp
    pub now: DateTime<Utc>,
    /// Teams the user belongs to
    pub team_count: Option<i64>,
    /// Whether the user captains a top-ten team
    pub captains_top_team: Option<bool>,
    /// Global leaderboard rank, 1 is best
    pub global_rank: Option<i64>,
    /// Total registered users
    pub total_users: Option<i64>,
    /// Position of this user in registration order, 1 is first
    pub registration_rank: Option<i64>,
    /// Catalog achievements tracked for this user
    pub achievements_total: i64,
    /// Catalog achievements completed
    pub achievements_completed: i64,
    /// Badges currently held (achievement and custom combined)
    pub badge_count: i64,
}

impl BadgeContext {
    /// Whether the user sits in the global top percentile by experience.
    #[must_use]
    pub fn in_elite_percentile(&self) -> bool {
        match (self.global_rank, self.total_users) {
            (Some(rank), Some(total)) if total > 0 => {
                let cutoff = (total as f64 * ELITE_PERCENTILE).ceil() as i64;
                rank <= cutoff.max(1)
            }
            _ => false,
        }
    }
}

/// Pure badge predicate over account state and the sweep context.
pub type BadgePredicate = fn(&ProfileAccount, &BadgeContext) -> bool;

/// One immutable custom badge definition.
#[derive(Clone)]
pub struct CustomBadgeDefinition {
    /// Stable badge id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Display icon
    pub icon: &'static str,
    /// Rarity tier
    pub rarity: Rarity,
    /// Display description
    pub description: &'static str,
    /// Unlock predicate
    pub predicate: BadgePredicate,
}

impl std::fmt::Debug for CustomBadgeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomBadgeDefinition")
            .field("id", &self.id)
            .field("rarity", &self.rarity)
            .finish_non_exhaustive()
    }
}

/// Immutable, validated registry of custom badge definitions.
#[derive(Debug, Clone)]
pub struct BadgeRegistry {
    definitions: Vec<CustomBadgeDefinition>,
    by_id: HashMap<&'static str, usize>,
}

impl BadgeRegistry {
    /// Build a registry, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when two definitions share an id.
    pub fn new(definitions: Vec<CustomBadgeDefinition>) -> AppResult<Self> {
        let mut by_id = HashMap::with_capacity(definitions.len());
        for (index, badge) in definitions.iter().enumerate() {
            if by_id.insert(badge.id, index).is_some() {
                return Err(AppError::config(format!("duplicate badge id '{}'", badge.id)));
            }
        }
        Ok(Self { definitions, by_id })
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CustomBadgeDefinition> {
        self.by_id.get(id).map(|&i| &self.definitions[i])
    }

    /// All definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CustomBadgeDefinition> {
        self.definitions.iter()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn same_day(a: DateTime<Utc>, year: i32, month: u32, day: u32) -> bool {
    NaiveDate::from_ymd_opt(year, month, day).is_some_and(|date| a.date_naive() == date)
}

fn badge(
    id: &'static str,
    name: &'static str,
    icon: &'static str,
    rarity: Rarity,
    description: &'static str,
    predicate: BadgePredicate,
) -> CustomBadgeDefinition {
    CustomBadgeDefinition {
        id,
        name,
        icon,
        rarity,
        description,
        predicate,
    }
}

/// The built-in custom badge registry.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn default_badges() -> BadgeRegistry {
    use Rarity::{Common, Legendary, Rare, Uncommon};

    let definitions = vec![
        // Tier 1 - starter badges
        badge("newcomer", "Newcomer", "🌱", Common, "Welcome to the journey", |_, _| true),
        badge("first_week", "First Week", "📅", Common, "Completed your first week", |account, ctx| {
            let days = (ctx.now - account.created_at).num_days();
            let sessions = account.stats.total_chats
                + account.stats.total_reports
                + account.stats.total_vision_analyses;
            days >= 7 && sessions >= 5
        }),
        badge("early_bird", "Early Bird", "🐦", Common, "Active before 8 AM", |account, _| {
            account.last_active.hour() < 8
        }),
        badge("night_owl", "Night Owl", "🦉", Common, "Active after midnight", |account, _| {
            account.last_active.hour() < 5
        }),
        badge("weekend_warrior", "Weekend Warrior", "🎯", Common, "Active on weekends", |account, _| {
            matches!(account.last_active.weekday(), Weekday::Sat | Weekday::Sun)
        }),
        // Tier 2 - activity badges
        badge("speed_demon", "Speed Demon", "⚡", Uncommon, "Reached 25 km/h speed", |account, _| {
            account.stats.running.best_speed_kmh >= 25.0
        }),
        badge("marathon_master", "Marathon Master", "🏃‍♂️", Uncommon, "Ran 42.195 km total", |account, _| {
            account.stats.running.total_distance_km >= 42.195
        }),
        badge("social_butterfly", "Social Butterfly", "🦋", Uncommon, "Joined 3+ teams", |_, ctx| {
            ctx.team_count.is_some_and(|n| n >= 3)
        }),
        badge("territory_king", "Territory King", "👑", Uncommon, "Captured 100 territories", |account, _| {
            account.stats.running.total_territories >= 100
        }),
        badge("challenge_hunter", "Challenge Hunter", "🎯", Uncommon, "Completed 50 challenges", |account, _| {
            account.stats.total_challenges >= 50
        }),
        badge("health_advocate", "Health Advocate", "💚", Uncommon, "Analyzed 50 reports", |account, _| {
            account.stats.total_reports >= 50
        }),
        badge("vision_expert", "Vision Expert", "👁️", Uncommon, "Ran 25 image analyses", |account, _| {
            account.stats.total_vision_analyses >= 25
        }),
        // Tier 3 - elite badges
        badge("legendary_runner", "Legendary Runner", "🏆", Rare, "Ran 1000 km total", |account, _| {
            account.stats.running.total_distance_km >= 1000.0
        }),
        badge("leaderboard_champion", "Leaderboard Champion", "🥇", Rare, "Reached #1 on the leaderboard", |_, ctx| {
            ctx.global_rank == Some(1)
        }),
        badge("team_leader", "Team Leader", "⭐", Rare, "Captain of a top 10 team", |_, ctx| {
            ctx.captains_top_team == Some(true)
        }),
        badge("consistency_champion", "Consistency Champion", "🔥", Rare, "100-day streak", |account, _| {
            account.stats.streak_days >= 100
        }),
        badge("wellness_guru", "Wellness Guru", "🧘", Rare, "Reached level 25", |account, _| {
            account.level >= 25
        }),
        badge("territory_overlord", "Territory Overlord", "🏰", Rare, "Captured 500 territories", |account, _| {
            account.stats.running.total_territories >= 500
        }),
        badge("speed_of_light", "Speed of Light", "💫", Rare, "Reached 30 km/h speed", |account, _| {
            account.stats.running.best_speed_kmh >= 30.0
        }),
        // Tier 4 - legendary badges
        badge("immortal", "Immortal", "💎", Legendary, "365-day streak", |account, _| {
            account.stats.streak_days >= 365
        }),
        badge("ultimate_champion", "Ultimate Champion", "👑", Legendary, "All achievements completed", |_, ctx| {
            ctx.achievements_total > 0 && ctx.achievements_completed == ctx.achievements_total
        }),
        badge("world_conqueror", "World Conqueror", "🌍", Legendary, "Captured 1000 territories", |account, _| {
            account.stats.running.total_territories >= 1000
        }),
        badge("ultra_marathon", "Ultra Marathon", "🦸", Legendary, "Ran 5000 km total", |account, _| {
            account.stats.running.total_distance_km >= 5000.0
        }),
        badge("centurion", "Centurion", "💯", Legendary, "Reached level 100", |account, _| {
            account.level >= 100
        }),
        // Special event badges
        badge("founder", "Founder", "🌟", Legendary, "Among the first 10 users", |_, ctx| {
            ctx.registration_rank
                .is_some_and(|rank| rank <= FOUNDER_USER_LIMIT)
        }),
        badge("valentine_2025", "Valentine 2025", "💝", Rare, "Active on Valentine's Day 2025", |account, _| {
            same_day(account.last_active, 2025, 2, 14)
        }),
        badge("new_year_2025", "New Year 2025", "🎉", Rare, "Started 2025 strong", |account, _| {
            let start = NaiveDate::from_ymd_opt(2025, 1, 1);
            let end = NaiveDate::from_ymd_opt(2025, 1, 7);
            match (start, end) {
                (Some(start), Some(end)) => {
                    let joined = account.created_at.date_naive();
                    joined >= start && joined <= end
                }
                _ => false,
            }
        }),
        badge("halloween_2024", "Halloween 2024", "🎃", Rare, "Active on Halloween 2024", |account, _| {
            same_day(account.last_active, 2024, 10, 31)
        }),
        badge("christmas_2024", "Christmas 2024", "🎄", Rare, "Active on Christmas 2024", |account, _| {
            same_day(account.last_active, 2024, 12, 25)
        }),
        // Community badges
        badge("helpful_hero", "Helpful Hero", "🦸‍♂️", Uncommon, "Helped 50 team members", |account, _| {
            account.stats.helped_users >= 50
        }),
        badge("motivator", "Motivator", "💪", Uncommon, "Inspired 100 runners", |account, _| {
            account.stats.motivations >= 100
        }),
        badge("ambassador", "Ambassador", "🎖️", Rare, "Invited 25 users", |account, _| {
            account.stats.referrals >= 25
        }),
        badge("perfectionist", "Perfectionist", "✨", Legendary, "All categories mastered", |account, _| {
            account.stats.total_chats >= 50
                && account.stats.total_reports >= 50
                && account.stats.total_vision_analyses >= 50
                && account.stats.running.total_runs >= 100
        }),
        badge("completionist_pro", "Completionist Pro", "🏅", Legendary, "All badges collected", |_, ctx| {
            ctx.badge_count >= 30
        }),
        badge("elite_athlete", "Elite Athlete", "⚡", Legendary, "Top 1% globally", |_, ctx| {
            ctx.in_elite_percentile()
        }),
    ];

    // Statically valid; covered by the registry tests.
    #[allow(clippy::unwrap_used)]
    BadgeRegistry::new(definitions).unwrap()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context() -> BadgeContext {
        BadgeContext {
            now: Utc::now(),
            team_count: None,
            captains_top_team: None,
            global_rank: None,
            total_users: None,
            registration_rank: None,
            achievements_total: 0,
            achievements_completed: 0,
            badge_count: 0,
        }
    }

    #[test]
    fn test_default_registry_is_valid() {
        let registry = default_badges();
        assert!(registry.len() >= 30);
        assert!(registry.get("newcomer").is_some());
        assert!(registry.get("made_up").is_none());
    }

    #[test]
    fn test_duplicate_badge_rejected() {
        let defs = vec![
            badge("x", "X", "x", Rarity::Common, "x", |_, _| true),
            badge("x", "Y", "y", Rarity::Rare, "y", |_, _| false),
        ];
        assert!(BadgeRegistry::new(defs).is_err());
    }

    #[test]
    fn test_missing_lookup_means_not_met() {
        let registry = default_badges();
        let account = ProfileAccount::new(Uuid::new_v4());
        let ctx = context();
        let social = registry.get("social_butterfly").unwrap();
        assert!(!(social.predicate)(&account, &ctx));
        let elite = registry.get("elite_athlete").unwrap();
        assert!(!(elite.predicate)(&account, &ctx));
    }

    #[test]
    fn test_elite_percentile_cutoff() {
        let mut ctx = context();
        ctx.global_rank = Some(1);
        ctx.total_users = Some(50);
        // ceil(50 * 0.01) == 1, so only rank 1 qualifies
        assert!(ctx.in_elite_percentile());
        ctx.global_rank = Some(2);
        assert!(!ctx.in_elite_percentile());
    }

    #[test]
    fn test_marathon_master_threshold() {
        let registry = default_badges();
        let marathon = registry.get("marathon_master").unwrap();
        let mut account = ProfileAccount::new(Uuid::new_v4());
        account.stats.running.total_distance_km = 42.0;
        assert!(!(marathon.predicate)(&account, &context()));
        account.stats.running.total_distance_km = 42.195;
        assert!((marathon.predicate)(&account, &context()));
    }

    #[test]
    fn test_seasonal_badge_window() {
        let registry = default_badges();
        let valentine = registry.get("valentine_2025").unwrap();
        let mut account = ProfileAccount::new(Uuid::new_v4());
        account.last_active = Utc.with_ymd_and_hms(2025, 2, 14, 9, 30, 0).unwrap();
        assert!((valentine.predicate)(&account, &context()));
        account.last_active = Utc.with_ymd_and_hms(2025, 2, 15, 0, 0, 0).unwrap();
        assert!(!(valentine.predicate)(&account, &context()));
    }

    #[test]
    fn test_founder_requires_registration_rank() {
        let registry = default_badges();
        let founder = registry.get("founder").unwrap();
        let account = ProfileAccount::new(Uuid::new_v4());
        let mut ctx = context();
        assert!(!(founder.predicate)(&account, &ctx));
        ctx.registration_rank = Some(3);
        assert!((founder.predicate)(&account, &ctx));
        ctx.registration_rank = Some(11);
        assert!(!(founder.predicate)(&account, &ctx));
    }
}
