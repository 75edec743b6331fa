//! Integration tests for streaks and achievement unlocking.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use fitquest::games::types::{GameType, TrackingMethod, TrackingSample};
use fitquest::{Database, SessionManager, StatsService};
use uuid::Uuid;

fn setup() -> (Arc<Database>, SessionManager, StatsService) {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create database"));
    let manager = SessionManager::new(db.clone());
    let stats = StatsService::new(db.clone());
    (db, manager, stats)
}

fn play_at(
    manager: &SessionManager,
    user_id: Uuid,
    game_type: GameType,
    score: i64,
    ended_at: DateTime<Utc>,
) -> fitquest::games::types::SessionSummary {
    let session_id = manager
        .start_session(user_id, game_type, TrackingMethod::Manual)
        .unwrap();
    manager
        .report_score(
            user_id,
            session_id,
            score,
            TrackingSample::new(ended_at, score.max(0) as u32, 0.8),
        )
        .unwrap();
    manager.end_session_at(user_id, session_id, ended_at).unwrap()
}

#[test]
fn test_first_game_achievement() {
    let (db, manager, _stats) = setup();
    let user = db.create_user("alex").unwrap();

    let summary = play_at(&manager, user.id, GameType::SquatTap, 5, Utc::now());

    let ids: Vec<&str> = summary
        .new_achievements
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert!(ids.contains(&"first_game"));
}

#[test]
fn test_achievements_not_awarded_twice() {
    let (db, manager, stats) = setup();
    let user = db.create_user("alex").unwrap();

    let first = play_at(&manager, user.id, GameType::SquatTap, 5, Utc::now());
    assert!(first.new_achievements.iter().any(|a| a.id == "first_game"));

    let second = play_at(&manager, user.id, GameType::SquatTap, 5, Utc::now());
    assert!(!second.new_achievements.iter().any(|a| a.id == "first_game"));

    // Exactly one earned row exists
    let report = stats.user_stats(user.id).unwrap();
    let first_game_rows = report
        .achievements
        .iter()
        .filter(|a| a.achievement_id == "first_game")
        .count();
    assert_eq!(first_game_rows, 1);
}

#[test]
fn test_streak_increments_across_days() {
    let (db, manager, _stats) = setup();
    let user = db.create_user("alex").unwrap();
    let day0 = Utc::now();

    let s1 = play_at(&manager, user.id, GameType::SquatTap, 10, day0);
    assert_eq!(s1.current_streak, 1);

    let s2 = play_at(&manager, user.id, GameType::SquatTap, 10, day0 + Duration::days(1));
    assert_eq!(s2.current_streak, 2);

    // Same calendar day again: unchanged
    let s3 = play_at(&manager, user.id, GameType::SquatTap, 10, day0 + Duration::days(1));
    assert_eq!(s3.current_streak, 2);

    let s4 = play_at(&manager, user.id, GameType::SquatTap, 10, day0 + Duration::days(2));
    assert_eq!(s4.current_streak, 3);
    assert!(s4.new_achievements.iter().any(|a| a.id == "streak_3"));
    assert_eq!(s4.longest_streak, 3);
}

#[test]
fn test_streak_reset_after_gap() {
    let (db, manager, _stats) = setup();
    let user = db.create_user("alex").unwrap();
    let day0 = Utc::now();

    play_at(&manager, user.id, GameType::JumpCounter, 5, day0);
    let s2 = play_at(&manager, user.id, GameType::JumpCounter, 5, day0 + Duration::days(1));
    assert_eq!(s2.current_streak, 2);

    // Three-day gap resets the run but keeps the record
    let s3 = play_at(&manager, user.id, GameType::JumpCounter, 5, day0 + Duration::days(4));
    assert_eq!(s3.current_streak, 1);
    assert_eq!(s3.longest_streak, 2);
}

#[test]
fn test_performance_achievement_on_best_score() {
    let (db, manager, _stats) = setup();
    let user = db.create_user("alex").unwrap();

    let below = play_at(&manager, user.id, GameType::SquatTap, 99, Utc::now());
    assert!(!below.new_achievements.iter().any(|a| a.id == "squat_master"));

    let at_threshold = play_at(&manager, user.id, GameType::SquatTap, 100, Utc::now());
    assert!(at_threshold
        .new_achievements
        .iter()
        .any(|a| a.id == "squat_master"));
}

#[test]
fn test_calorie_and_strength_achievements() {
    let (db, manager, _stats) = setup();
    let user = db.create_user("alex").unwrap();

    // 700 burpees: 1050 calories burned, well past both thresholds
    let summary = play_at(&manager, user.id, GameType::BurpeeChallenge, 700, Utc::now());

    let ids: Vec<&str> = summary
        .new_achievements
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert!(ids.contains(&"burpee_beast"));
    assert!(ids.contains(&"calorie_burner"));
}

#[test]
fn test_achievement_points_not_auto_credited() {
    let (db, manager, _stats) = setup();
    let user = db.create_user("alex").unwrap();

    let summary = play_at(&manager, user.id, GameType::SquatTap, 10, Utc::now());
    assert!(summary
        .new_achievements
        .iter()
        .any(|a| a.points_reward > 0));

    // Balance reflects only session points; crediting rewards is the
    // caller's explicit choice
    let user_after = db.get_user(&user.id).unwrap().unwrap();
    assert_eq!(user_after.points, summary.points_earned);
}

#[test]
fn test_earned_achievements_in_report() {
    let (db, manager, stats) = setup();
    let user = db.create_user("alex").unwrap();

    play_at(&manager, user.id, GameType::PlankTimer, 130, Utc::now());

    let report = stats.user_stats(user.id).unwrap();
    let ids: Vec<&str> = report
        .achievements
        .iter()
        .map(|a| a.achievement_id.as_str())
        .collect();
    assert!(ids.contains(&"first_game"));
    assert!(ids.contains(&"plank_pro"));

    let plank = report
        .achievements
        .iter()
        .find(|a| a.achievement_id == "plank_pro")
        .unwrap();
    assert_eq!(plank.name, "Plank Pro");
    assert_eq!(plank.points_reward, 60);
}
