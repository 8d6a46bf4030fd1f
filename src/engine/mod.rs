// ABOUTME: Achievement engine entry point: per-user serialization and the three engine components
// ABOUTME: Hosts the user lock registry shared by report, bootstrap, and sweep paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Achievement Engine
//!
//! Three components share the storage layer and a per-user lock registry:
//!
//! - [`AchievementEngine`](report::AchievementEngine) evaluates activity
//!   events against the catalog and awards threshold achievements.
//! - [`Bootstrapper`](bootstrap::Bootstrapper) seeds a new user's full
//!   achievement set, including bootstrap-time grants.
//! - [`BadgeEvaluator`](sweep::BadgeEvaluator) sweeps custom badge
//!   predicates.
//!
//! All mutation paths acquire the user's lock for the whole
//! read-modify-write sequence. Achievement state is fully partitioned by
//! user, so no cross-user locking exists anywhere. The storage layer's
//! conditional completion update is an independent second guard, so
//! completion stays at-most-once even for callers that bypass the registry.

pub mod bootstrap;
pub mod report;
pub mod sweep;

pub use bootstrap::Bootstrapper;
pub use report::AchievementEngine;
pub use sweep::BadgeEvaluator;

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-user mutual-exclusion scopes.
///
/// Locks are created lazily on first use and shared by clone between the
/// engine components, so two concurrent activity reports (or a report racing
/// a sweep) for the same user serialize.
#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one user, waiting if another engine operation
    /// on the same user is in flight.
    pub async fn acquire(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
