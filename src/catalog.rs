// ABOUTME: Immutable achievement catalog with category partitioning and id lookup
// ABOUTME: Defines activity categories, achievement definitions, and the built-in registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Achievement Catalog
//!
//! A [`Catalog`] is the process-wide, immutable table of achievement
//! definitions. It is built once at startup and injected into the engine;
//! nothing mutates it afterwards. Lookup by id is O(1) and per-category
//! listing preserves declaration order, which determines both evaluation
//! order and the order of unlock lists returned to callers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{
    special_ids, COMPLETIONIST_FEATURE_COUNT, DEDICATED_SESSION_TARGET, HEALTH_GURU_LEVEL,
};
use crate::errors::{AppError, AppResult};
use crate::models::Rarity;

/// Activity dimension an achievement tracks.
///
/// `Special` achievements (bootstrap grants and compound checks) are never
/// driven by category events; the engine evaluates them from account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// AI health chat sessions
    Chat,
    /// Medical report analyses
    Report,
    /// Medical image analyses
    Vision,
    /// Symptom checker sessions
    Symptom,
    /// Consecutive-day usage streaks
    Streak,
    /// Completed runs
    Running,
    /// Cumulative running distance (km)
    Distance,
    /// Captured map territories
    Territory,
    /// Team membership and contribution
    Team,
    /// Completed challenges
    Challenge,
    /// Best recorded speed (km/h)
    Speed,
    /// Global leaderboard rank (lower is better)
    Leaderboard,
    /// Bootstrap grants and compound achievements
    Special,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Chat,
        Self::Report,
        Self::Vision,
        Self::Symptom,
        Self::Streak,
        Self::Running,
        Self::Distance,
        Self::Territory,
        Self::Team,
        Self::Challenge,
        Self::Speed,
        Self::Leaderboard,
        Self::Special,
    ];

    /// String form used in storage and event payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Report => "report",
            Self::Vision => "vision",
            Self::Symptom => "symptom",
            Self::Streak => "streak",
            Self::Running => "running",
            Self::Distance => "distance",
            Self::Territory => "territory",
            Self::Team => "team",
            Self::Challenge => "challenge",
            Self::Speed => "speed",
            Self::Leaderboard => "leaderboard",
            Self::Special => "special",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "report" => Ok(Self::Report),
            "vision" => Ok(Self::Vision),
            "symptom" => Ok(Self::Symptom),
            "streak" => Ok(Self::Streak),
            // Activity collaborators historically report runs as "run"
            "running" | "run" => Ok(Self::Running),
            "distance" => Ok(Self::Distance),
            "territory" => Ok(Self::Territory),
            "team" => Ok(Self::Team),
            "challenge" => Ok(Self::Challenge),
            "speed" => Ok(Self::Speed),
            "leaderboard" => Ok(Self::Leaderboard),
            "special" => Ok(Self::Special),
            other => Err(AppError::invalid_input(format!(
                "unknown activity category: {other}"
            ))),
        }
    }
}

/// Reward attached to an achievement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    /// Experience points deposited on completion
    pub experience_points: i64,
    /// Icon recorded on the badge entry
    pub badge_icon: String,
}

/// One immutable achievement definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDefinition {
    /// Stable, globally unique id
    pub id: String,
    /// Category whose counter drives this achievement
    pub category: Category,
    /// Display title
    pub title: String,
    /// Display description
    pub description: String,
    /// Display icon
    pub icon: String,
    /// Threshold the cumulative counter must reach or exceed
    pub target: i64,
    /// Reward granted on completion
    pub reward: Reward,
}

impl AchievementDefinition {
    /// Display rarity tier for the badge minted on completion, derived
    /// from the reward size.
    #[must_use]
    pub const fn badge_rarity(&self) -> Rarity {
        match self.reward.experience_points {
            i64::MIN..=99 => Rarity::Common,
            100..=299 => Rarity::Uncommon,
            300..=999 => Rarity::Rare,
            _ => Rarity::Legendary,
        }
    }
}

/// Immutable, validated registry of achievement definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<AchievementDefinition>,
    by_id: HashMap<String, usize>,
    by_category: HashMap<Category, Vec<usize>>,
}

impl Catalog {
    /// Build a catalog from a list of definitions.
    ///
    /// Definition order is preserved and becomes evaluation order within
    /// each category.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for duplicate ids or non-positive targets.
    pub fn new(definitions: Vec<AchievementDefinition>) -> AppResult<Self> {
        let mut by_id = HashMap::with_capacity(definitions.len());
        let mut by_category: HashMap<Category, Vec<usize>> = HashMap::new();

        for (index, def) in definitions.iter().enumerate() {
            if def.target <= 0 {
                return Err(AppError::config(format!(
                    "achievement '{}' has non-positive target {}",
                    def.id, def.target
                )));
            }
            if by_id.insert(def.id.clone(), index).is_some() {
                return Err(AppError::config(format!(
                    "duplicate achievement id '{}'",
                    def.id
                )));
            }
            by_category.entry(def.category).or_default().push(index);
        }

        Ok(Self {
            definitions,
            by_id,
            by_category,
        })
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AchievementDefinition> {
        self.by_id.get(id).map(|&i| &self.definitions[i])
    }

    /// Definitions for one category, in declaration order.
    pub fn for_category(&self, category: Category) -> impl Iterator<Item = &AchievementDefinition> {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.definitions[i])
    }

    /// All definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.definitions.iter()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn def(
    id: &str,
    category: Category,
    title: &str,
    description: &str,
    icon: &str,
    target: i64,
    xp: i64,
) -> AchievementDefinition {
    AchievementDefinition {
        id: id.into(),
        category,
        title: title.into(),
        description: description.into(),
        icon: icon.into(),
        target,
        reward: Reward {
            experience_points: xp,
            badge_icon: icon.into(),
        },
    }
}

/// The built-in production catalog.
///
/// Declaration order is load-bearing: progress listings and unlock lists
/// follow it.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn default_catalog() -> Catalog {
    use Category::{
        Challenge, Chat, Distance, Leaderboard, Report, Running, Special, Speed, Streak, Symptom,
        Team, Territory, Vision,
    };

    let definitions = vec![
        // Chat
        def("first_chat", Chat, "First Steps", "Send your first message to the assistant", "💬", 1, 10),
        def("chat_5", Chat, "Getting Started", "Have 5 chat sessions", "🗣️", 5, 25),
        def("chat_10", Chat, "Regular Visitor", "Have 10 chat sessions", "💭", 10, 50),
        def("chat_25", Chat, "Health Enthusiast", "Have 25 chat sessions", "🎯", 25, 100),
        def("chat_50", Chat, "Wellness Warrior", "Have 50 chat sessions", "⚔️", 50, 200),
        // Report
        def("first_report", Report, "Report Rookie", "Analyze your first medical report", "📄", 1, 15),
        def("report_5", Report, "Data Collector", "Analyze 5 medical reports", "📊", 5, 50),
        def("report_10", Report, "Health Tracker", "Analyze 10 medical reports", "📈", 10, 100),
        def("report_25", Report, "Master Analyst", "Analyze 25 medical reports", "🎓", 25, 250),
        // Vision
        def("first_vision", Vision, "Eagle Eye", "Run your first image analysis", "👁️", 1, 20),
        def("vision_5", Vision, "Image Explorer", "Analyze 5 medical images", "🔍", 5, 75),
        def("vision_10", Vision, "Vision Master", "Analyze 10 medical images", "🦅", 10, 150),
        // Symptom
        def("first_symptom", Symptom, "Self Diagnosis", "Complete your first symptom check", "🩺", 1, 15),
        def("symptom_5", Symptom, "Health Detective", "Complete 5 symptom checks", "🔬", 5, 50),
        def("symptom_10", Symptom, "Symptom Tracker", "Complete 10 symptom checks", "📋", 10, 100),
        def("symptom_25", Symptom, "Symptom Savant", "Complete 25 symptom checks", "🧠", 25, 250),
        // Running
        def("first_run", Running, "First Steps", "Complete your first run", "👟", 1, 25),
        def("run_5", Running, "Getting Active", "Complete 5 runs", "🏃", 5, 50),
        def("run_10", Running, "Regular Runner", "Complete 10 runs", "🏃‍♂️", 10, 100),
        def("run_25", Running, "Dedicated Runner", "Complete 25 runs", "💪", 25, 200),
        def("run_50", Running, "Marathon Spirit", "Complete 50 runs", "🎽", 50, 400),
        def("run_100", Running, "Century Club", "Complete 100 runs", "💯", 100, 800),
        // Distance
        def("distance_1km", Distance, "First Kilometer", "Run your first kilometer", "🎯", 1, 20),
        def("distance_5km", Distance, "5K Achiever", "Run a total of 5 kilometers", "🏅", 5, 50),
        def("distance_10km", Distance, "10K Champion", "Run a total of 10 kilometers", "🥇", 10, 100),
        def("distance_25km", Distance, "Quarter Century", "Run a total of 25 kilometers", "⭐", 25, 200),
        def("distance_50km", Distance, "Half Century", "Run a total of 50 kilometers", "🌟", 50, 400),
        def("distance_100km", Distance, "Century Runner", "Run a total of 100 kilometers", "👑", 100, 800),
        def("distance_250km", Distance, "Ultra Runner", "Run a total of 250 kilometers", "🦸", 250, 1500),
        def("distance_500km", Distance, "Legend", "Run a total of 500 kilometers", "🔥", 500, 3000),
        // Territory
        def("first_territory", Territory, "Territory Hunter", "Capture your first territory", "🗺️", 1, 30),
        def("territory_5", Territory, "Land Grabber", "Capture 5 territories", "🏰", 5, 75),
        def("territory_10", Territory, "Territory Master", "Capture 10 territories", "🏛️", 10, 150),
        def("territory_25", Territory, "Empire Builder", "Capture 25 territories", "🌍", 25, 350),
        def("territory_50", Territory, "Conqueror", "Capture 50 territories", "⚔️", 50, 700),
        // Team
        def("first_team", Team, "Team Player", "Join your first team", "👥", 1, 25),
        def("team_captain", Team, "Team Captain", "Create your own team", "👑", 1, 50),
        def("team_contributor", Team, "Team Contributor", "Contribute 10km to your team", "🤝", 10, 100),
        def("team_champion", Team, "Team Champion", "Contribute 50km to your team", "🏆", 50, 300),
        def("team_legend", Team, "Team Legend", "Contribute 100km to your team", "💎", 100, 600),
        // Challenge
        def("first_challenge", Challenge, "Challenge Accepted", "Complete your first challenge", "🎯", 1, 30),
        def("challenge_5", Challenge, "Challenge Seeker", "Complete 5 challenges", "🔍", 5, 100),
        def("challenge_10", Challenge, "Challenge Master", "Complete 10 challenges", "🎖️", 10, 200),
        def("challenge_25", Challenge, "Challenge Dominator", "Complete 25 challenges", "⚡", 25, 500),
        // Speed
        def("speed_10kmh", Speed, "Speed Walker", "Reach 10 km/h speed", "🚶‍♂️", 10, 50),
        def("speed_15kmh", Speed, "Jogger", "Reach 15 km/h speed", "🏃", 15, 100),
        def("speed_20kmh", Speed, "Sprinter", "Reach 20 km/h speed", "💨", 20, 200),
        // Leaderboard. Targets are rank milestones; the leaderboard
        // collaborator reports a value that reaches the target once the
        // rank is attained.
        def("top_100", Leaderboard, "Top 100", "Reach top 100 on the global leaderboard", "📊", 100, 100),
        def("top_50", Leaderboard, "Top 50", "Reach top 50 on the global leaderboard", "📈", 50, 200),
        def("top_10", Leaderboard, "Top 10", "Reach top 10 on the global leaderboard", "🥉", 10, 500),
        def("top_3", Leaderboard, "Podium Finish", "Reach top 3 on the global leaderboard", "🥈", 3, 1000),
        def("rank_1", Leaderboard, "Number One", "Reach #1 on the global leaderboard", "🥇", 1, 2000),
        // Streak
        def("streak_3", Streak, "Consistent Care", "Stay active 3 days in a row", "🔥", 3, 50),
        def("streak_7", Streak, "Week Warrior", "Stay active 7 days in a row", "⭐", 7, 100),
        def("streak_30", Streak, "Monthly Master", "Stay active 30 days in a row", "👑", 30, 500),
        // Special
        def(special_ids::EARLY_ADOPTER, Special, "Early Adopter", "Join during the early days", "🌟", 1, 100),
        def(special_ids::COMPLETIONIST, Special, "Completionist", "Use all main features", "🏆", COMPLETIONIST_FEATURE_COUNT, 150),
        def(special_ids::HEALTH_GURU, Special, "Health Guru", "Reach level 10", "🧘", HEALTH_GURU_LEVEL, 300),
        def(special_ids::DEDICATED, Special, "Dedicated User", "Complete 50 total sessions", "💎", DEDICATED_SESSION_TARGET, 400),
        def(special_ids::PIONEER, Special, "Pioneer", "Be among the first 100 users", "🚀", 1, 200),
    ];

    // The built-in set is statically valid; a failure here is a programming
    // error caught by the catalog tests.
    #[allow(clippy::unwrap_used)]
    Catalog::new(definitions).unwrap()
}
