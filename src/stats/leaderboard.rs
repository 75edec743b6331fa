//! Leaderboard rankings service.
//!
//! Ranks users per game type by best score; ties go to whoever reached
//! the score first.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::games::types::GameType;
use crate::storage::database::parse_timestamp;
use crate::storage::Database;

/// Default number of leaderboard entries returned.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Leaderboard entry.
#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: Uuid,
    pub username: String,
    pub best_score: u32,
    pub games_played: u32,
    pub average_score: f64,
    pub achieved_at: Option<DateTime<Utc>>,
}

/// Leaderboard service.
pub struct LeaderboardService {
    db: Arc<Database>,
    limit: usize,
}

impl LeaderboardService {
    /// Create a new leaderboard service with the default size.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            limit: DEFAULT_LEADERBOARD_SIZE,
        }
    }

    /// Create a service returning `limit` entries per query.
    pub fn with_limit(db: Arc<Database>, limit: usize) -> Self {
        Self { db, limit }
    }

    /// Top players for a game type, best score descending.
    ///
    /// Users who never scored are excluded; equal scores rank by who
    /// achieved the score earliest.
    pub fn top(&self, game_type: GameType) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(
                "SELECT u.id, u.username, gs.best_score, gs.games_played,
                        gs.average_score, gs.best_achieved_at
                 FROM game_stats gs
                 JOIN users u ON gs.user_id = u.id
                 WHERE gs.game_type = ?1 AND gs.best_score > 0
                 ORDER BY gs.best_score DESC, gs.best_achieved_at ASC
                 LIMIT ?2",
            )
            .map_err(|e| LeaderboardError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(
                rusqlite::params![game_type.as_str(), self.limit as i64],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .map_err(|e| LeaderboardError::DatabaseError(e.to_string()))?;

        let mut entries = Vec::new();
        let mut rank = 0u32;

        for row in rows {
            rank += 1;
            let (user_id_str, username, best_score, games_played, average_score, achieved_str) =
                row.map_err(|e| LeaderboardError::DatabaseError(e.to_string()))?;

            entries.push(LeaderboardEntry {
                rank,
                user_id: Uuid::parse_str(&user_id_str)
                    .map_err(|e| LeaderboardError::DatabaseError(e.to_string()))?,
                username,
                best_score,
                games_played,
                average_score,
                achieved_at: achieved_str
                    .as_deref()
                    .map(parse_timestamp)
                    .transpose()
                    .map_err(|e| LeaderboardError::DatabaseError(e.to_string()))?,
            });
        }

        Ok(entries)
    }
}

/// Leaderboard errors.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}
