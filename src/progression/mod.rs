//! User progression: cumulative stats, levels and the atomic ledger.

pub mod ledger;
pub mod levels;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::games::types::GameType;

/// A user's identity and cumulative progression stats.
///
/// Every cumulative field is monotonically non-decreasing over the user's
/// lifetime; the only writer is the progression ledger, which applies
/// additive deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Unique username (case-insensitive)
    pub username: String,
    /// Lifetime points
    pub points: u64,
    /// Lifetime calories burned
    pub calories_burned: f64,
    /// Lifetime active time in minutes
    pub time_active: f64,
    /// Lifetime finalized sessions
    pub workouts_completed: u32,
    /// Lifetime experience; levels derive from this
    pub experience: u64,
    /// Signup timestamp
    pub created_at: DateTime<Utc>,
    /// Last ledger update
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Fresh record for a new signup.
    pub fn new(username: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            points: 0,
            calories_burned: 0.0,
            time_active: 0.0,
            workouts_completed: 0,
            experience: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current level, derived from experience.
    pub fn level(&self) -> u32 {
        levels::level_for_xp(self.experience)
    }
}

/// Per (user, game type) aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStat {
    /// Owning user
    pub user_id: Uuid,
    /// Which game this aggregates
    pub game_type: GameType,
    /// Finalized sessions of this game
    pub games_played: u32,
    /// Highest score ever
    pub best_score: u32,
    /// When the current best was first reached (leaderboard tie-break)
    pub best_achieved_at: Option<DateTime<Utc>>,
    /// Sum of all session scores
    pub total_score: u64,
    /// total_score / games_played
    pub average_score: f64,
    /// Most recent finalized session
    pub last_played: Option<DateTime<Utc>>,
}

/// The deltas one finalized session contributes to a user's aggregates.
#[derive(Debug, Clone, Copy)]
pub struct SessionOutcome {
    /// Which game produced the outcome
    pub game_type: GameType,
    /// Final session score
    pub score: u32,
    /// Points delta
    pub points: u64,
    /// Calories delta
    pub calories: f64,
    /// Active-time delta in minutes
    pub duration_minutes: f64,
}
