//! Per-user stats overview: cumulative totals, per-game aggregates,
//! streaks, earned achievements and recent session history.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::achievements::EarnedAchievement;
use crate::games::streaks::StreakState;
use crate::games::types::GameSession;
use crate::progression::ledger::ProgressionLedger;
use crate::progression::{GameStat, UserRecord};
use crate::storage::game_store::GameStore;
use crate::storage::{Database, DatabaseError};

/// How many recent sessions a stats report includes.
const RECENT_SESSIONS_LIMIT: usize = 10;

/// Everything a profile or dashboard view needs for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserStatsReport {
    /// Identity and cumulative totals
    pub user: UserRecord,
    /// Level derived from experience
    pub level: u32,
    /// Per-game aggregates
    pub game_stats: Vec<GameStat>,
    /// Daily streak state
    pub streak: StreakState,
    /// Earned achievements, newest first
    pub achievements: Vec<EarnedAchievement>,
    /// Most recent finalized sessions, newest first
    pub recent_sessions: Vec<GameSession>,
}

/// User stats reporting service.
pub struct StatsService {
    db: Arc<Database>,
}

impl StatsService {
    /// Create a new stats service.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Build the full stats report for a user.
    pub fn user_stats(&self, user_id: Uuid) -> Result<UserStatsReport, StatsError> {
        let conn = self.db.connection();
        let ledger = ProgressionLedger::new(conn);
        let store = GameStore::new(conn);

        let user = ledger
            .get_user(user_id)?
            .ok_or(StatsError::UserNotFound(user_id))?;

        let level = user.level();
        let game_stats = ledger.list_game_stats(user_id)?;
        let streak = store.get_streak(user_id)?.unwrap_or_default();
        let achievements = store.earned_achievements(user_id)?;
        let recent_sessions = store.recent_sessions(user_id, RECENT_SESSIONS_LIMIT)?;

        Ok(UserStatsReport {
            user,
            level,
            game_stats,
            streak,
            achievements,
            recent_sessions,
        })
    }
}

/// Stats reporting errors.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}
