//! Game data storage operations.
//!
//! Provides persistence for:
//! - Game sessions and their tracking samples
//! - Daily streaks
//! - Earned achievements

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::achievements::{AchievementCategory, EarnedAchievement};
use crate::games::streaks::StreakState;
use crate::games::types::{GameSession, GameType, TrackingMethod, TrackingSample};
use crate::storage::database::{parse_timestamp, DatabaseError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Game store for persisting session and progression data.
pub struct GameStore<'a> {
    conn: &'a Connection,
}

impl<'a> GameStore<'a> {
    /// Create a new game store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Session Operations ==========

    /// Insert a newly started session.
    pub fn insert_session(&self, session: &GameSession) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO game_sessions
                     (session_id, user_id, username, game_type, tracking_method,
                      start_time, end_time, duration_minutes, score,
                      points_earned, calories_burned, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, NULL, ?7, NULL, NULL, ?8)",
                params![
                    session.session_id.to_string(),
                    session.user_id.to_string(),
                    session.username,
                    session.game_type.as_str(),
                    session.tracking_method.as_str(),
                    session.start_time.to_rfc3339(),
                    session.score,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Get a session by ID.
    pub fn get_session(&self, session_id: Uuid) -> Result<Option<GameSession>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM game_sessions WHERE session_id = ?1"
            ))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![session_id.to_string()], SessionRow::from_row);

        match result {
            Ok(row) => Ok(Some(row.into_session()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get a user's still-active session, if any.
    pub fn active_session(&self, user_id: Uuid) -> Result<Option<GameSession>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM game_sessions
                 WHERE user_id = ?1 AND end_time IS NULL"
            ))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt
            .query_row(params![user_id.to_string()], SessionRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        result.map(SessionRow::into_session).transpose()
    }

    /// Delete a session and (via cascade) its tracking samples.
    pub fn delete_session(&self, session_id: Uuid) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "DELETE FROM game_sessions WHERE session_id = ?1",
                params![session_id.to_string()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Overwrite the current score of an active session.
    ///
    /// Returns the number of rows updated; 0 means the session does not
    /// exist or is already finalized.
    pub fn update_score(&self, session_id: Uuid, score: u32) -> Result<usize, DatabaseError> {
        self.conn
            .execute(
                "UPDATE game_sessions SET score = ?1
                 WHERE session_id = ?2 AND end_time IS NULL",
                params![score, session_id.to_string()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    /// Finalize a session: stamp end time, duration and earned rewards.
    ///
    /// Only succeeds while `end_time` is still unset; returns the number of
    /// rows updated, so 0 signals an already-finalized session.
    pub fn finalize_session(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration_minutes: f64,
        points_earned: u64,
        calories_burned: f64,
    ) -> Result<usize, DatabaseError> {
        self.conn
            .execute(
                "UPDATE game_sessions SET
                     end_time = ?1,
                     duration_minutes = ?2,
                     points_earned = ?3,
                     calories_burned = ?4
                 WHERE session_id = ?5 AND end_time IS NULL",
                params![
                    end_time.to_rfc3339(),
                    duration_minutes,
                    points_earned as i64,
                    calories_burned,
                    session_id.to_string(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    /// A user's most recent finalized sessions, newest first.
    pub fn recent_sessions(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<GameSession>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM game_sessions
                 WHERE user_id = ?1 AND end_time IS NOT NULL
                 ORDER BY end_time DESC
                 LIMIT ?2"
            ))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![user_id.to_string(), limit as i64],
                SessionRow::from_row,
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(
                row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
                    .into_session()?,
            );
        }
        Ok(sessions)
    }

    // ========== Tracking Sample Operations ==========

    /// Append a tracking sample to a session.
    pub fn insert_sample(
        &self,
        session_id: Uuid,
        sample: &TrackingSample,
    ) -> Result<(), DatabaseError> {
        let sensor_json = sample
            .sensor_data
            .as_ref()
            .map(|v| serde_json::to_string(v))
            .transpose()
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO tracking_samples
                     (session_id, recorded_at, exercise_count, confidence, sensor_data_json)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session_id.to_string(),
                    sample.recorded_at.to_rfc3339(),
                    sample.exercise_count,
                    sample.confidence,
                    sensor_json,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// All tracking samples for a session, oldest first.
    pub fn samples(&self, session_id: Uuid) -> Result<Vec<TrackingSample>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT recorded_at, exercise_count, confidence, sensor_data_json
                 FROM tracking_samples WHERE session_id = ?1 ORDER BY id",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![session_id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut samples = Vec::new();
        for row in rows {
            let (recorded_at, exercise_count, confidence, sensor_json) =
                row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            let sensor_data = sensor_json
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?;

            samples.push(TrackingSample {
                recorded_at: parse_timestamp(&recorded_at)?,
                exercise_count,
                confidence,
                sensor_data,
            });
        }
        Ok(samples)
    }

    // ========== Streak Operations ==========

    /// Load a user's streak state, if any activity was ever recorded.
    pub fn get_streak(&self, user_id: Uuid) -> Result<Option<StreakState>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT current_streak, longest_streak, last_activity_date
                 FROM user_streaks WHERE user_id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt
            .query_row(params![user_id.to_string()], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        match result {
            Some((current_streak, longest_streak, last_date)) => {
                let last_activity_date = last_date
                    .map(|s| {
                        NaiveDate::parse_from_str(&s, DATE_FORMAT)
                            .map_err(|e| DatabaseError::DeserializationError(e.to_string()))
                    })
                    .transpose()?;

                Ok(Some(StreakState {
                    current_streak,
                    longest_streak,
                    last_activity_date,
                }))
            }
            None => Ok(None),
        }
    }

    /// Store a user's streak state.
    pub fn put_streak(&self, user_id: Uuid, streak: &StreakState) -> Result<(), DatabaseError> {
        let last_date = streak
            .last_activity_date
            .map(|d| d.format(DATE_FORMAT).to_string());

        self.conn
            .execute(
                "INSERT OR REPLACE INTO user_streaks
                     (user_id, current_streak, longest_streak, last_activity_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user_id.to_string(),
                    streak.current_streak,
                    streak.longest_streak,
                    last_date,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    // ========== Achievement Operations ==========

    /// IDs of all achievements a user has earned.
    pub fn earned_achievement_ids(&self, user_id: Uuid) -> Result<HashSet<String>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT achievement_id FROM user_achievements WHERE user_id = ?1")
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id.to_string()], |row| row.get::<_, String>(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }
        Ok(ids)
    }

    /// Record an earned achievement.
    pub fn record_achievement(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        earned_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO user_achievements (user_id, achievement_id, earned_at)
                 VALUES (?1, ?2, ?3)",
                params![
                    user_id.to_string(),
                    achievement_id,
                    earned_at.to_rfc3339(),
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DatabaseError::ConstraintViolation(format!(
                        "achievement '{achievement_id}' already earned"
                    ))
                }
                other => DatabaseError::QueryFailed(other.to_string()),
            })?;

        Ok(())
    }

    /// A user's earned achievements with display fields, newest first.
    pub fn earned_achievements(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EarnedAchievement>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT a.id, a.name, a.description, a.category, a.points_reward, a.icon,
                        ua.earned_at
                 FROM achievements a
                 JOIN user_achievements ua ON a.id = ua.achievement_id
                 WHERE ua.user_id = ?1
                 ORDER BY ua.earned_at DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut earned = Vec::new();
        for row in rows {
            let (id, name, description, category, points_reward, icon, earned_at) =
                row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            earned.push(EarnedAchievement {
                achievement_id: id,
                name,
                description,
                category: AchievementCategory::from_str(&category)
                    .unwrap_or(AchievementCategory::Milestone),
                points_reward,
                icon,
                earned_at: parse_timestamp(&earned_at)?,
            });
        }
        Ok(earned)
    }
}

const SESSION_COLUMNS: &str = "session_id, user_id, username, game_type, tracking_method, \
                               start_time, end_time, duration_minutes, score, \
                               points_earned, calories_burned";

/// Raw `game_sessions` row before parsing.
struct SessionRow {
    session_id: String,
    user_id: String,
    username: String,
    game_type: String,
    tracking_method: String,
    start_time: String,
    end_time: Option<String>,
    duration_minutes: Option<f64>,
    score: u32,
    points_earned: Option<i64>,
    calories_burned: Option<f64>,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            session_id: row.get(0)?,
            user_id: row.get(1)?,
            username: row.get(2)?,
            game_type: row.get(3)?,
            tracking_method: row.get(4)?,
            start_time: row.get(5)?,
            end_time: row.get(6)?,
            duration_minutes: row.get(7)?,
            score: row.get(8)?,
            points_earned: row.get(9)?,
            calories_burned: row.get(10)?,
        })
    }

    fn into_session(self) -> Result<GameSession, DatabaseError> {
        Ok(GameSession {
            session_id: Uuid::parse_str(&self.session_id)
                .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?,
            user_id: Uuid::parse_str(&self.user_id)
                .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?,
            username: self.username,
            game_type: GameType::from_str(&self.game_type),
            tracking_method: TrackingMethod::from_str(&self.tracking_method),
            start_time: parse_timestamp(&self.start_time)?,
            end_time: self.end_time.as_deref().map(parse_timestamp).transpose()?,
            duration_minutes: self.duration_minutes,
            score: self.score,
            points_earned: self.points_earned.map(|p| p as u64),
            calories_burned: self.calories_burned,
        })
    }
}
