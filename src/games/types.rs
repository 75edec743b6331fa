//! Core types for exercise mini-game sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::achievements::Achievement;

/// Exercise mini-game variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Squat Tap Challenge
    SquatTap,
    /// Jump Counter
    JumpCounter,
    /// Plank Timer (score is seconds held)
    PlankTimer,
    /// Burpee Challenge
    BurpeeChallenge,
    /// Unrecognized game type; rewarded with default multipliers
    Other,
}

impl GameType {
    /// Wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::SquatTap => "squat_tap",
            GameType::JumpCounter => "jump_counter",
            GameType::PlankTimer => "plank_timer",
            GameType::BurpeeChallenge => "burpee_challenge",
            GameType::Other => "other",
        }
    }

    /// Parse a wire name. Unknown names map to [`GameType::Other`] rather
    /// than failing; they earn the default reward multipliers.
    pub fn from_str(s: &str) -> Self {
        match s {
            "squat_tap" => GameType::SquatTap,
            "jump_counter" => GameType::JumpCounter,
            "plank_timer" => GameType::PlankTimer,
            "burpee_challenge" => GameType::BurpeeChallenge,
            _ => GameType::Other,
        }
    }

    /// All playable game types (excludes the `Other` fallback).
    pub fn playable() -> [GameType; 4] {
        [
            GameType::SquatTap,
            GameType::JumpCounter,
            GameType::PlankTimer,
            GameType::BurpeeChallenge,
        ]
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How exercise repetitions were counted for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMethod {
    /// User taps/reports reps manually
    #[default]
    Manual,
    /// Device sensor counted reps
    Sensor,
    /// Backfilled from an external fitness platform
    ExternalSync,
}

impl TrackingMethod {
    /// Wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMethod::Manual => "manual",
            TrackingMethod::Sensor => "sensor",
            TrackingMethod::ExternalSync => "external_sync",
        }
    }

    /// Parse a wire name; unknown names default to manual tracking.
    pub fn from_str(s: &str) -> Self {
        match s {
            "sensor" => TrackingMethod::Sensor,
            "external_sync" => TrackingMethod::ExternalSync,
            _ => TrackingMethod::Manual,
        }
    }
}

/// One per-tick progress report attached to an active session.
///
/// `confidence` is an opaque client-supplied number in 0..1; the engine
/// stores it but never computes with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSample {
    /// When the client recorded the sample
    pub recorded_at: DateTime<Utc>,
    /// Cumulative exercise count at this tick
    pub exercise_count: u32,
    /// Client-reported tracking confidence (0..1)
    pub confidence: f64,
    /// Raw sensor payload, if any
    pub sensor_data: Option<serde_json::Value>,
}

impl TrackingSample {
    /// Sample with an explicit confidence and no sensor payload.
    pub fn new(recorded_at: DateTime<Utc>, exercise_count: u32, confidence: f64) -> Self {
        Self {
            recorded_at,
            exercise_count,
            confidence,
            sensor_data: None,
        }
    }

    /// Attach a raw sensor payload.
    pub fn with_sensor_data(mut self, data: serde_json::Value) -> Self {
        self.sensor_data = Some(data);
        self
    }
}

/// A single timed play of a mini-game.
///
/// Created on start, mutated only by score updates while active, and
/// immutable once `end_time` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    /// Unique session identifier
    pub session_id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Owning user's name (denormalized for history views)
    pub username: String,
    /// Which mini-game was played
    pub game_type: GameType,
    /// How reps were counted
    pub tracking_method: TrackingMethod,
    /// When the session started
    pub start_time: DateTime<Utc>,
    /// When the session was finalized; `None` while active
    pub end_time: Option<DateTime<Utc>>,
    /// Derived end − start, in minutes
    pub duration_minutes: Option<f64>,
    /// Latest cumulative in-game score
    pub score: u32,
    /// Points credited at finalization
    pub points_earned: Option<u64>,
    /// Calories credited at finalization
    pub calories_burned: Option<f64>,
}

impl GameSession {
    /// Create a new active session.
    pub fn new(
        user_id: Uuid,
        username: String,
        game_type: GameType,
        tracking_method: TrackingMethod,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            username,
            game_type,
            tracking_method,
            start_time,
            end_time: None,
            duration_minutes: None,
            score: 0,
            points_earned: None,
            calories_burned: None,
        }
    }

    /// Whether the session is still accepting score updates.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Result payload returned to the caller when a session is finalized.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// The finalized session
    pub session_id: Uuid,
    /// Which mini-game was played
    pub game_type: GameType,
    /// Final score
    pub score: u32,
    /// Points earned by this session
    pub points_earned: u64,
    /// Calories burned by this session
    pub calories_burned: f64,
    /// Session length in minutes
    pub duration_minutes: f64,
    /// User's lifetime points after the update
    pub total_points: u64,
    /// User's level after the update
    pub level: u32,
    /// Achievements unlocked by this session
    pub new_achievements: Vec<Achievement>,
    /// Consecutive-day streak after the update
    pub current_streak: u32,
    /// Longest streak ever
    pub longest_streak: u32,
    /// Best score for this game type after the update
    pub best_score: u32,
    /// Whether this session's score equals the post-update best
    pub is_personal_best: bool,
}
