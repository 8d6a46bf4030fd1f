// ABOUTME: Shared numeric constants for leveling, bootstrap grants, and compound achievements
// ABOUTME: Centralized so thresholds are never duplicated across engine modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine-wide constants.

/// Experience points required per level. Level is always
/// `floor(experience_total / XP_PER_LEVEL) + 1`.
pub const XP_PER_LEVEL: i64 = 100;

/// A user counts as a pioneer when the global user count at bootstrap time
/// is at or below this value.
pub const PIONEER_USER_LIMIT: i64 = 100;

/// Founder badge cut-off: registration rank within the first N users.
pub const FOUNDER_USER_LIMIT: i64 = 10;

/// Number of distinct features the completionist achievement requires
/// (chat, report, vision, symptom check).
pub const COMPLETIONIST_FEATURE_COUNT: i64 = 4;

/// Total session count (chats + reports + vision + symptom checks) for the
/// dedicated achievement.
pub const DEDICATED_SESSION_TARGET: i64 = 50;

/// Level threshold for the health guru achievement.
pub const HEALTH_GURU_LEVEL: i64 = 10;

/// Fraction of users counted as the global elite for the elite athlete badge.
pub const ELITE_PERCENTILE: f64 = 0.01;

/// Achievement ids for the special (compound/bootstrap) achievements.
/// These are never driven by category events.
pub mod special_ids {
    /// Granted to every newly bootstrapped account.
    pub const EARLY_ADOPTER: &str = "early_adopter";
    /// Granted at bootstrap when the user is among the first 100 registered.
    pub const PIONEER: &str = "pioneer";
    /// All four main features used at least once.
    pub const COMPLETIONIST: &str = "completionist";
    /// Fifty total sessions across the main features.
    pub const DEDICATED: &str = "dedicated";
    /// Level 10 reached.
    pub const HEALTH_GURU: &str = "health_guru";
}

/// Compute the level for an experience total.
#[must_use]
pub const fn level_for_experience(experience_total: i64) -> i64 {
    experience_total / XP_PER_LEVEL + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_experience() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(99), 1);
        assert_eq!(level_for_experience(100), 2);
        assert_eq!(level_for_experience(250), 3);
        assert_eq!(level_for_experience(1000), 11);
    }
}
