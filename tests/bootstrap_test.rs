// ABOUTME: Integration tests for the bootstrap path that seeds a new user's achievement set
// ABOUTME: Covers repeat-call idempotence, launch-window grants, and the single bonus deposit
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::Harness;
use trailmark::constants::{special_ids, PIONEER_USER_LIMIT};
use trailmark::errors::ErrorCode;
use uuid::Uuid;

#[tokio::test]
async fn test_bootstrap_seeds_full_catalog() {
    let harness = Harness::new().await;
    let user = harness.new_user().await;

    let summary = harness.bootstrapper.initialize(user).await.unwrap();
    assert_eq!(summary.created, harness.catalog.len() as i64);

    let records = harness.engine.list_progress(user).await.unwrap();
    assert_eq!(records.len(), harness.catalog.len());
    assert!(records
        .iter()
        .filter(|r| r.achievement_id != special_ids::EARLY_ADOPTER
            && r.achievement_id != special_ids::PIONEER)
        .all(|r| !r.completed && r.progress == 0));
}

#[tokio::test]
async fn test_bootstrap_grants_launch_achievements_with_one_deposit() {
    let harness = Harness::new().await;
    // Two earlier registrations; the subject is the third user ever
    harness.bootstrapped_user().await;
    harness.bootstrapped_user().await;
    let user = harness.new_user().await;

    let summary = harness.bootstrapper.initialize(user).await.unwrap();
    assert_eq!(summary.bonus_experience, 300);

    for id in [special_ids::EARLY_ADOPTER, special_ids::PIONEER] {
        let record = harness.database.get_progress(user, id).await.unwrap().unwrap();
        assert!(record.completed, "{id} should be granted at bootstrap");
        let target = harness.catalog.get(id).unwrap().target;
        assert_eq!(record.progress, target);
    }

    // Both badges issued, and the combined bonus lands as one deposit
    let badges = harness.database.list_badges(user).await.unwrap();
    let ids: Vec<&str> = badges.iter().map(|b| b.badge_id.as_str()).collect();
    assert!(ids.contains(&special_ids::EARLY_ADOPTER));
    assert!(ids.contains(&special_ids::PIONEER));

    let account = harness.database.get_profile(user).await.unwrap().unwrap();
    assert_eq!(account.experience_total, 300);
    assert_eq!(account.level, 4);
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let harness = Harness::new().await;
    let user = harness.bootstrapped_user().await;
    let account = harness.database.get_profile(user).await.unwrap().unwrap();
    let xp_after_first = account.experience_total;

    let summary = harness.bootstrapper.initialize(user).await.unwrap();
    assert_eq!(summary.created, harness.catalog.len() as i64);
    assert_eq!(summary.bonus_experience, 0);

    let records = harness.engine.list_progress(user).await.unwrap();
    assert_eq!(records.len(), harness.catalog.len());

    // No second deposit, no duplicate badges
    let account = harness.database.get_profile(user).await.unwrap().unwrap();
    assert_eq!(account.experience_total, xp_after_first);
    let badges = harness.database.list_badges(user).await.unwrap();
    assert_eq!(badges.len(), 2);
}

#[tokio::test]
async fn test_pioneer_closes_after_user_limit() {
    let harness = Harness::new().await;
    for _ in 0..PIONEER_USER_LIMIT {
        harness.new_user().await;
    }
    let user = harness.new_user().await;

    let summary = harness.bootstrapper.initialize(user).await.unwrap();
    // Only the early adopter bonus remains past the launch window
    assert_eq!(summary.bonus_experience, 100);

    let pioneer = harness
        .database
        .get_progress(user, special_ids::PIONEER)
        .await
        .unwrap()
        .unwrap();
    assert!(!pioneer.completed);
    assert_eq!(pioneer.progress, 0);

    let early = harness
        .database
        .get_progress(user, special_ids::EARLY_ADOPTER)
        .await
        .unwrap()
        .unwrap();
    assert!(early.completed);
}

#[tokio::test]
async fn test_bootstrap_unknown_user_is_not_found() {
    let harness = Harness::new().await;
    let error = harness
        .bootstrapper
        .initialize(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
}
