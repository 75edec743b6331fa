//! Progression ledger: the single writer for a user's cumulative stats.
//!
//! Applies one finalized session's deltas to the `users` row and the
//! per-game aggregate, as additive updates only. Counters are never
//! overwritten with absolute values, so concurrent finalizations cannot
//! lose updates. The ledger borrows a connection; callers that need
//! atomicity across ledger, streak and achievement writes run it inside
//! a transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{GameStat, SessionOutcome, UserRecord};
use crate::games::types::GameType;
use crate::storage::database::{parse_timestamp, UserRow};
use crate::storage::DatabaseError;

/// Ledger over a borrowed connection.
pub struct ProgressionLedger<'a> {
    conn: &'a Connection,
}

impl<'a> ProgressionLedger<'a> {
    /// Create a ledger over the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Apply one finalized session's deltas to a user's aggregates.
    ///
    /// Increments points, calories, active time, workout count and
    /// experience on the user row, and upserts the (user, game type)
    /// aggregate: games_played + 1, best_score = max, total_score += score,
    /// average recomputed, best_achieved_at stamped only when the best
    /// improves. Returns the post-update user and game aggregate.
    pub fn apply_session_outcome(
        &self,
        user_id: Uuid,
        outcome: &SessionOutcome,
        now: DateTime<Utc>,
    ) -> Result<(UserRecord, GameStat), DatabaseError> {
        let updated = self
            .conn
            .execute(
                "UPDATE users SET
                     points = points + ?1,
                     calories_burned = calories_burned + ?2,
                     time_active = time_active + ?3,
                     workouts_completed = workouts_completed + 1,
                     experience = experience + ?1,
                     updated_at = ?4
                 WHERE id = ?5",
                params![
                    outcome.points as i64,
                    outcome.calories,
                    outcome.duration_minutes,
                    now.to_rfc3339(),
                    user_id.to_string(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if updated == 0 {
            return Err(DatabaseError::NotFound(format!("user {user_id}")));
        }

        self.conn
            .execute(
                "INSERT INTO game_stats
                     (user_id, game_type, games_played, best_score, best_achieved_at,
                      total_score, average_score, last_played)
                 VALUES (?1, ?2, 1, ?3, ?4, ?3, ?3, ?4)
                 ON CONFLICT(user_id, game_type) DO UPDATE SET
                     games_played = games_played + 1,
                     best_achieved_at = CASE
                         WHEN excluded.best_score > best_score
                         THEN excluded.best_achieved_at
                         ELSE best_achieved_at
                     END,
                     best_score = MAX(best_score, excluded.best_score),
                     total_score = total_score + excluded.total_score,
                     average_score = CAST(total_score + excluded.total_score AS REAL)
                         / (games_played + 1),
                     last_played = excluded.last_played",
                params![
                    user_id.to_string(),
                    outcome.game_type.as_str(),
                    outcome.score,
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let user = self.get_user(user_id)?.ok_or_else(|| {
            DatabaseError::NotFound(format!("user {user_id}"))
        })?;
        let stat = self
            .get_game_stat(user_id, outcome.game_type)?
            .ok_or_else(|| {
                DatabaseError::NotFound(format!("game stat {user_id}/{}", outcome.game_type))
            })?;

        Ok((user, stat))
    }

    /// Fold an achievement's points reward into the user's balance.
    ///
    /// Explicitly caller-decided; session finalization never invokes this
    /// on its own.
    pub fn credit_achievement_points(
        &self,
        user_id: Uuid,
        points: u32,
        now: DateTime<Utc>,
    ) -> Result<UserRecord, DatabaseError> {
        let updated = self
            .conn
            .execute(
                "UPDATE users SET
                     points = points + ?1,
                     experience = experience + ?1,
                     updated_at = ?2
                 WHERE id = ?3",
                params![i64::from(points), now.to_rfc3339(), user_id.to_string()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if updated == 0 {
            return Err(DatabaseError::NotFound(format!("user {user_id}")));
        }

        self.get_user(user_id)?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {user_id}")))
    }

    /// Load a user's aggregate record.
    pub fn get_user(&self, user_id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, points, calories_burned, time_active,
                        workouts_completed, experience, created_at, updated_at
                 FROM users WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![user_id.to_string()], UserRow::from_row);

        match result {
            Ok(row) => Ok(Some(row.into_user()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Load the (user, game type) aggregate, if any sessions were played.
    pub fn get_game_stat(
        &self,
        user_id: Uuid,
        game_type: GameType,
    ) -> Result<Option<GameStat>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_id, game_type, games_played, best_score, best_achieved_at,
                        total_score, average_score, last_played
                 FROM game_stats WHERE user_id = ?1 AND game_type = ?2",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(
            params![user_id.to_string(), game_type.as_str()],
            GameStatRow::from_row,
        );

        match result {
            Ok(row) => Ok(Some(row.into_stat()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// All per-game aggregates for a user.
    pub fn list_game_stats(&self, user_id: Uuid) -> Result<Vec<GameStat>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_id, game_type, games_played, best_score, best_achieved_at,
                        total_score, average_score, last_played
                 FROM game_stats WHERE user_id = ?1 ORDER BY game_type",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id.to_string()], GameStatRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut stats = Vec::new();
        for row in rows {
            stats.push(
                row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
                    .into_stat()?,
            );
        }
        Ok(stats)
    }

    /// Total finalized sessions across all game types.
    pub fn total_games(&self, user_id: Uuid) -> Result<u32, DatabaseError> {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(games_played), 0) FROM game_stats WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }
}

/// Raw `game_stats` row before parsing.
pub(crate) struct GameStatRow {
    user_id: String,
    game_type: String,
    games_played: u32,
    best_score: u32,
    best_achieved_at: Option<String>,
    total_score: i64,
    average_score: f64,
    last_played: Option<String>,
}

impl GameStatRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            game_type: row.get(1)?,
            games_played: row.get(2)?,
            best_score: row.get(3)?,
            best_achieved_at: row.get(4)?,
            total_score: row.get(5)?,
            average_score: row.get(6)?,
            last_played: row.get(7)?,
        })
    }

    pub(crate) fn into_stat(self) -> Result<GameStat, DatabaseError> {
        Ok(GameStat {
            user_id: Uuid::parse_str(&self.user_id)
                .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?,
            game_type: GameType::from_str(&self.game_type),
            games_played: self.games_played,
            best_score: self.best_score,
            best_achieved_at: self
                .best_achieved_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            total_score: self.total_score as u64,
            average_score: self.average_score,
            last_played: self.last_played.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}
