//! Integration tests for the session lifecycle.
//!
//! Tests the full flow from start through score reporting to finalization,
//! including duplicate-finalization rejection and aggregate monotonicity.

use std::sync::Arc;

use chrono::{Duration, Utc};
use fitquest::games::session::SessionError;
use fitquest::games::types::{GameType, TrackingMethod, TrackingSample};
use fitquest::{Database, SessionManager, StatsService};
use uuid::Uuid;

fn setup() -> (Arc<Database>, SessionManager) {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create database"));
    let manager = SessionManager::new(db.clone());
    (db, manager)
}

fn sample(count: u32) -> TrackingSample {
    TrackingSample::new(Utc::now(), count, 0.8)
}

#[test]
fn test_full_session_flow() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();

    let session_id = manager
        .start_session(user.id, GameType::SquatTap, TrackingMethod::Manual)
        .unwrap();

    manager
        .report_score(user.id, session_id, 10, sample(10))
        .unwrap();
    manager
        .report_score(user.id, session_id, 25, sample(25))
        .unwrap();

    let summary = manager.end_session(user.id, session_id).unwrap();

    // Last reported score wins; it is not additive
    assert_eq!(summary.score, 25);
    assert_eq!(summary.points_earned, 50); // 25 * 2, no duration bonus
    assert_eq!(summary.calories_burned, 12.5);
    assert_eq!(summary.total_points, 50);
    assert_eq!(summary.current_streak, 1);
    assert!(summary.is_personal_best);
    assert_eq!(summary.best_score, 25);

    // User aggregates were committed
    let updated = db.get_user(&user.id).unwrap().unwrap();
    assert_eq!(updated.points, 50);
    assert_eq!(updated.workouts_completed, 1);
    assert!(updated.calories_burned > 0.0);
}

#[test]
fn test_duration_bonus_scenario() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();

    let session_id = manager
        .start_session(user.id, GameType::SquatTap, TrackingMethod::Manual)
        .unwrap();
    manager
        .report_score(user.id, session_id, 60, sample(60))
        .unwrap();

    let summary = manager
        .end_session_at(user.id, session_id, Utc::now() + Duration::minutes(6))
        .unwrap();

    assert_eq!(summary.points_earned, 144); // floor(60 * 2 * 1.2)
    assert_eq!(summary.calories_burned, 33.0); // round(60 * 0.5 * 1.1, 2)
    assert!(summary.duration_minutes > 5.0);
}

#[test]
fn test_start_requires_known_user() {
    let (_db, manager) = setup();

    let result = manager.start_session(Uuid::new_v4(), GameType::SquatTap, TrackingMethod::Manual);
    assert!(matches!(result, Err(SessionError::NotAuthenticated)));
}

#[test]
fn test_report_score_unknown_session() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();

    let result = manager.report_score(user.id, Uuid::new_v4(), 10, sample(10));
    assert!(matches!(result, Err(SessionError::NoActiveSession(_))));
}

#[test]
fn test_report_score_wrong_owner() {
    let (db, manager) = setup();
    let alex = db.create_user("alex").unwrap();
    let toni = db.create_user("toni").unwrap();

    let session_id = manager
        .start_session(alex.id, GameType::JumpCounter, TrackingMethod::Manual)
        .unwrap();

    let result = manager.report_score(toni.id, session_id, 10, sample(10));
    assert!(matches!(result, Err(SessionError::NoActiveSession(_))));

    // The session is untouched and still ends cleanly for its owner
    let summary = manager.end_session(alex.id, session_id).unwrap();
    assert_eq!(summary.score, 0);
}

#[test]
fn test_negative_score_clamped() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();

    let session_id = manager
        .start_session(user.id, GameType::SquatTap, TrackingMethod::Manual)
        .unwrap();
    let stored = manager
        .report_score(user.id, session_id, -40, sample(0))
        .unwrap();
    assert_eq!(stored, 0);

    let summary = manager.end_session(user.id, session_id).unwrap();
    assert_eq!(summary.points_earned, 0);
}

#[test]
fn test_duplicate_finalization_rejected() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();

    let session_id = manager
        .start_session(user.id, GameType::BurpeeChallenge, TrackingMethod::Sensor)
        .unwrap();
    manager
        .report_score(user.id, session_id, 20, sample(20))
        .unwrap();

    manager.end_session(user.id, session_id).unwrap();
    let points_after_first = db.get_user(&user.id).unwrap().unwrap().points;

    let result = manager.end_session(user.id, session_id);
    assert!(matches!(
        result,
        Err(SessionError::DuplicateFinalization(_))
    ));

    // Rewards were applied exactly once
    let user_after = db.get_user(&user.id).unwrap().unwrap();
    assert_eq!(user_after.points, points_after_first);
    assert_eq!(user_after.workouts_completed, 1);
}

#[test]
fn test_score_updates_rejected_after_end() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();

    let session_id = manager
        .start_session(user.id, GameType::PlankTimer, TrackingMethod::Manual)
        .unwrap();
    manager.end_session(user.id, session_id).unwrap();

    let result = manager.report_score(user.id, session_id, 99, sample(99));
    assert!(matches!(result, Err(SessionError::NoActiveSession(_))));
}

#[test]
fn test_new_session_replaces_active_one() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();

    let first = manager
        .start_session(user.id, GameType::SquatTap, TrackingMethod::Manual)
        .unwrap();
    manager.report_score(user.id, first, 40, sample(40)).unwrap();

    let second = manager
        .start_session(user.id, GameType::JumpCounter, TrackingMethod::Manual)
        .unwrap();
    assert_ne!(first, second);

    // The replaced session is gone; its in-progress score is discarded
    let result = manager.end_session(user.id, first);
    assert!(matches!(result, Err(SessionError::NoActiveSession(_))));

    let summary = manager.end_session(user.id, second).unwrap();
    assert_eq!(summary.score, 0);

    let user_after = db.get_user(&user.id).unwrap().unwrap();
    assert_eq!(user_after.workouts_completed, 1);
    assert_eq!(user_after.points, 0);
}

#[test]
fn test_personal_best_tracking() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();

    let play = |score: i64| {
        let session_id = manager
            .start_session(user.id, GameType::SquatTap, TrackingMethod::Manual)
            .unwrap();
        manager
            .report_score(user.id, session_id, score, sample(score.max(0) as u32))
            .unwrap();
        manager.end_session(user.id, session_id).unwrap()
    };

    let first = play(80);
    assert!(first.is_personal_best);
    assert_eq!(first.best_score, 80);

    let higher = play(100);
    assert!(higher.is_personal_best);
    assert_eq!(higher.best_score, 100);

    let lower = play(90);
    assert!(!lower.is_personal_best);
    assert_eq!(lower.best_score, 100);

    // Tying the existing best still counts as a personal best
    let tie = play(100);
    assert!(tie.is_personal_best);
    assert_eq!(tie.best_score, 100);
}

#[test]
fn test_aggregates_monotonic() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();
    let stats = StatsService::new(db.clone());

    let mut prev_points = 0u64;
    let mut prev_calories = 0.0f64;
    let mut prev_time = 0.0f64;
    let mut prev_workouts = 0u32;
    let mut prev_best = 0u32;

    for score in [30i64, 5, 0, 60, 12] {
        let session_id = manager
            .start_session(user.id, GameType::JumpCounter, TrackingMethod::Manual)
            .unwrap();
        manager
            .report_score(user.id, session_id, score, sample(score as u32))
            .unwrap();
        manager.end_session(user.id, session_id).unwrap();

        let report = stats.user_stats(user.id).unwrap();
        assert!(report.user.points >= prev_points);
        assert!(report.user.calories_burned >= prev_calories);
        assert!(report.user.time_active >= prev_time);
        assert!(report.user.workouts_completed > prev_workouts);

        let best = report.game_stats[0].best_score;
        assert!(best >= prev_best);

        prev_points = report.user.points;
        prev_calories = report.user.calories_burned;
        prev_time = report.user.time_active;
        prev_workouts = report.user.workouts_completed;
        prev_best = best;
    }
}

#[test]
fn test_game_stat_aggregation() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();
    let stats = StatsService::new(db.clone());

    for score in [10i64, 20, 30] {
        let session_id = manager
            .start_session(user.id, GameType::PlankTimer, TrackingMethod::Manual)
            .unwrap();
        manager
            .report_score(user.id, session_id, score, sample(score as u32))
            .unwrap();
        manager.end_session(user.id, session_id).unwrap();
    }

    let report = stats.user_stats(user.id).unwrap();
    assert_eq!(report.game_stats.len(), 1);

    let stat = &report.game_stats[0];
    assert_eq!(stat.games_played, 3);
    assert_eq!(stat.best_score, 30);
    assert_eq!(stat.total_score, 60);
    assert!((stat.average_score - 20.0).abs() < 1e-9);
    assert!(stat.last_played.is_some());
}

#[test]
fn test_recent_sessions_in_report() {
    let (db, manager) = setup();
    let user = db.create_user("alex").unwrap();
    let stats = StatsService::new(db.clone());

    for i in 0..3 {
        let session_id = manager
            .start_session(user.id, GameType::SquatTap, TrackingMethod::Manual)
            .unwrap();
        manager
            .report_score(user.id, session_id, i * 10, sample((i * 10) as u32))
            .unwrap();
        manager
            .end_session_at(user.id, session_id, Utc::now() + Duration::seconds(i))
            .unwrap();
    }

    let report = stats.user_stats(user.id).unwrap();
    assert_eq!(report.recent_sessions.len(), 3);
    // Newest first
    assert_eq!(report.recent_sessions[0].score, 20);
    assert!(report.recent_sessions.iter().all(|s| !s.is_active()));
}
