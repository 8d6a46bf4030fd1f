// ABOUTME: Shared test harness: in-memory database, engine components, and stub lookups
// ABOUTME: Used by the integration test suites under tests/
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use trailmark::badges::{default_badges, ExternalLookups};
use trailmark::catalog::{default_catalog, Catalog};
use trailmark::database::Database;
use trailmark::engine::{AchievementEngine, BadgeEvaluator, Bootstrapper, UserLocks};
use trailmark::models::ProfileAccount;
use uuid::Uuid;

/// Everything a test needs, wired over one in-memory database.
pub struct Harness {
    pub database: Database,
    pub catalog: Arc<Catalog>,
    pub locks: UserLocks,
    pub engine: AchievementEngine,
    pub bootstrapper: Bootstrapper,
}

impl Harness {
    pub async fn new() -> Self {
        let database = Database::new("sqlite::memory:")
            .await
            .expect("in-memory database");
        let catalog = Arc::new(default_catalog());
        let locks = UserLocks::new();
        let engine = AchievementEngine::new(database.clone(), catalog.clone(), locks.clone());
        let bootstrapper = Bootstrapper::new(database.clone(), catalog.clone(), locks.clone());
        Self {
            database,
            catalog,
            locks,
            engine,
            bootstrapper,
        }
    }

    /// Create a profile and seed its full achievement set.
    pub async fn bootstrapped_user(&self) -> Uuid {
        let user = self.new_user().await;
        self.bootstrapper.initialize(user).await.expect("bootstrap");
        user
    }

    /// Create a bare profile without progress records.
    pub async fn new_user(&self) -> Uuid {
        let user = Uuid::new_v4();
        self.database
            .create_profile(&ProfileAccount::new(user))
            .await
            .expect("create profile");
        user
    }

    /// Build a badge evaluator with the given lookups.
    pub fn sweeper(&self, lookups: Arc<dyn ExternalLookups>) -> BadgeEvaluator {
        BadgeEvaluator::new(
            self.database.clone(),
            Arc::new(default_badges()),
            lookups,
            self.locks.clone(),
        )
    }
}

/// Lookups stub returning fixed values; `None` fields report failure so
/// soft-fail paths can be exercised.
#[derive(Debug, Clone, Default)]
pub struct StaticLookups {
    pub team_count: Option<i64>,
    pub captains_top_team: Option<bool>,
    pub global_rank: Option<i64>,
    pub total_users: Option<i64>,
    pub now: Option<DateTime<Utc>>,
}

#[async_trait]
impl ExternalLookups for StaticLookups {
    async fn team_count_for_user(&self, _user_id: Uuid) -> anyhow::Result<i64> {
        self.team_count
            .ok_or_else(|| anyhow::anyhow!("team lookup unavailable"))
    }

    async fn captains_top_team(&self, _user_id: Uuid) -> anyhow::Result<bool> {
        self.captains_top_team
            .ok_or_else(|| anyhow::anyhow!("captain lookup unavailable"))
    }

    async fn global_rank(&self, _user_id: Uuid) -> anyhow::Result<i64> {
        self.global_rank
            .ok_or_else(|| anyhow::anyhow!("rank lookup unavailable"))
    }

    async fn total_users(&self) -> anyhow::Result<i64> {
        self.total_users
            .ok_or_else(|| anyhow::anyhow!("user count unavailable"))
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}
