// ABOUTME: Library entry point for the trailmark achievement and progression engine
// ABOUTME: Re-exports the catalog, storage, engine components, and badge registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # Trailmark
//!
//! Rule-driven achievement/progression engine for fitness and health
//! gamification backends. Activity collaborators (chat, report analysis,
//! vision, symptom checks, runs, territories, teams, challenges) report
//! lifetime cumulative counts; the engine tracks per-user progress against
//! an immutable catalog, awards experience and levels, and issues badges —
//! with at-most-once completion guarantees under concurrent triggers.
//!
//! ## Components
//!
//! - **Catalog** ([`catalog`]): immutable registry of threshold
//!   achievements, partitioned by category in declaration order.
//! - **Storage** ([`database`]): SQLite-backed progress records, profile
//!   accounts, and badge lists; composite unique keys carry the
//!   idempotency guarantees.
//! - **Engine** ([`engine`]): [`Bootstrapper`](engine::Bootstrapper) seeds
//!   new users, [`AchievementEngine`](engine::AchievementEngine) evaluates
//!   activity events, [`BadgeEvaluator`](engine::BadgeEvaluator) sweeps
//!   custom badge predicates.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trailmark::badges::{default_badges, NoExternalLookups};
//! use trailmark::catalog::{default_catalog, Category};
//! use trailmark::database::Database;
//! use trailmark::engine::{AchievementEngine, BadgeEvaluator, Bootstrapper, UserLocks};
//! use trailmark::models::ProfileAccount;
//! use uuid::Uuid;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let database = Database::new("sqlite::memory:").await?;
//! let catalog = Arc::new(default_catalog());
//! let locks = UserLocks::new();
//!
//! let bootstrapper = Bootstrapper::new(database.clone(), catalog.clone(), locks.clone());
//! let engine = AchievementEngine::new(database.clone(), catalog, locks.clone());
//! let sweeper = BadgeEvaluator::new(
//!     database.clone(),
//!     Arc::new(default_badges()),
//!     Arc::new(NoExternalLookups),
//!     locks,
//! );
//!
//! let user = Uuid::new_v4();
//! database.create_profile(&ProfileAccount::new(user)).await?;
//! bootstrapper.initialize(user).await?;
//!
//! // The chat module updated its counters, then reports the new total
//! let unlocked = engine.report_activity(user, Category::Chat, 1).await?;
//! assert_eq!(unlocked[0].achievement_id, "first_chat");
//!
//! let new_badges = sweeper.sweep(user).await;
//! # let _ = new_badges;
//! # Ok(())
//! # }
//! ```

/// Custom badge definitions, predicates, and the external lookup capability
pub mod badges;

/// Immutable achievement catalog and activity categories
pub mod catalog;

/// Engine-wide numeric constants
pub mod constants;

/// SQLite-backed storage for profiles, progress, and badges
pub mod database;

/// Achievement engine: bootstrap, activity reports, and badge sweeps
pub mod engine;

/// Unified error handling
pub mod errors;

/// Structured logging configuration
pub mod logging;

/// Core data models
pub mod models;

pub use badges::{BadgeRegistry, CustomBadgeDefinition, ExternalLookups};
pub use catalog::{AchievementDefinition, Catalog, Category};
pub use database::Database;
pub use engine::{AchievementEngine, BadgeEvaluator, Bootstrapper, UserLocks};
pub use errors::{AppError, AppResult, ErrorCode};
pub use models::{
    BadgeAward, BootstrapSummary, LevelUp, ProfileAccount, ProgressRecord, Rarity, SweptBadge,
    UnlockedAchievement,
};
