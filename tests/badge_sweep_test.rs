// ABOUTME: Integration tests for custom badge sweeps over the default registry
// ABOUTME: Covers award uniqueness, lookup soft-fail, and context-driven badges
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{Harness, StaticLookups};
use std::sync::Arc;
use trailmark::badges::NoExternalLookups;
use trailmark::constants::special_ids;
use uuid::Uuid;

#[tokio::test]
async fn test_newcomer_awarded_once() {
    let harness = Harness::new().await;
    let user = harness.bootstrapped_user().await;
    let sweeper = harness.sweeper(Arc::new(NoExternalLookups));

    let awarded = sweeper.sweep(user).await;
    assert!(awarded.iter().any(|b| b.badge_id == "newcomer"));

    // Held badges are final; a second sweep reports nothing new
    let again = sweeper.sweep(user).await;
    assert!(again.is_empty());

    let held = harness.database.list_badges(user).await.unwrap();
    assert_eq!(held.iter().filter(|b| b.badge_id == "newcomer").count(), 1);
}

#[tokio::test]
async fn test_failed_lookups_only_lock_their_badges() {
    let harness = Harness::new().await;
    let user = harness.bootstrapped_user().await;
    // Every external lookup errors out
    let sweeper = harness.sweeper(Arc::new(StaticLookups::default()));

    let awarded = sweeper.sweep(user).await;
    assert!(awarded.iter().any(|b| b.badge_id == "newcomer"));
    assert!(!awarded.iter().any(|b| b.badge_id == "social_butterfly"));
    assert!(!awarded.iter().any(|b| b.badge_id == "elite_athlete"));
}

#[tokio::test]
async fn test_team_membership_badge() {
    let harness = Harness::new().await;
    let user = harness.bootstrapped_user().await;
    let sweeper = harness.sweeper(Arc::new(StaticLookups {
        team_count: Some(3),
        ..StaticLookups::default()
    }));

    let awarded = sweeper.sweep(user).await;
    assert!(awarded.iter().any(|b| b.badge_id == "social_butterfly"));
}

#[tokio::test]
async fn test_leaderboard_rank_badges() {
    let harness = Harness::new().await;
    let user = harness.bootstrapped_user().await;
    let sweeper = harness.sweeper(Arc::new(StaticLookups {
        global_rank: Some(1),
        total_users: Some(50),
        ..StaticLookups::default()
    }));

    // Rank 1 of 50 is both the champion and inside the top percentile
    let awarded = sweeper.sweep(user).await;
    assert!(awarded.iter().any(|b| b.badge_id == "leaderboard_champion"));
    assert!(awarded.iter().any(|b| b.badge_id == "elite_athlete"));
}

#[tokio::test]
async fn test_founder_tracks_registration_order() {
    let harness = Harness::new().await;
    let first = harness.bootstrapped_user().await;
    let sweeper = harness.sweeper(Arc::new(NoExternalLookups));

    let awarded = sweeper.sweep(first).await;
    assert!(awarded.iter().any(|b| b.badge_id == "founder"));

    for _ in 0..9 {
        harness.new_user().await;
    }
    let eleventh = harness.bootstrapped_user().await;
    let awarded = sweeper.sweep(eleventh).await;
    assert!(!awarded.iter().any(|b| b.badge_id == "founder"));
}

#[tokio::test]
async fn test_level_badge_from_account_state() {
    let harness = Harness::new().await;
    let user = harness.bootstrapped_user().await;
    harness.database.add_experience(user, 2500).await.unwrap();

    let sweeper = harness.sweeper(Arc::new(NoExternalLookups));
    let awarded = sweeper.sweep(user).await;
    assert!(awarded.iter().any(|b| b.badge_id == "wellness_guru"));
}

#[tokio::test]
async fn test_ultimate_champion_requires_full_catalog() {
    let harness = Harness::new().await;
    let user = harness.bootstrapped_user().await;
    let sweeper = harness.sweeper(Arc::new(NoExternalLookups));

    let awarded = sweeper.sweep(user).await;
    assert!(!awarded.iter().any(|b| b.badge_id == "ultimate_champion"));

    // Complete everything the bootstrap grants left pending
    for definition in harness.catalog.iter() {
        if definition.id == special_ids::EARLY_ADOPTER || definition.id == special_ids::PIONEER {
            continue;
        }
        harness.engine.award_manual(user, &definition.id).await.unwrap();
    }

    let awarded = sweeper.sweep(user).await;
    assert!(awarded.iter().any(|b| b.badge_id == "ultimate_champion"));
}

#[tokio::test]
async fn test_sweep_unknown_user_is_silent() {
    let harness = Harness::new().await;
    let sweeper = harness.sweeper(Arc::new(NoExternalLookups));
    let awarded = sweeper.sweep(Uuid::new_v4()).await;
    assert!(awarded.is_empty());
}
