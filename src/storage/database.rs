//! Database operations using rusqlite.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use thiserror::Error;
use uuid::Uuid;

use crate::achievements::definitions;
use crate::progression::UserRecord;
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        // Create schema version table
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        // Check current version
        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        self.seed_achievements()?;

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            // Initial schema
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            // Record version
            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        // Future migrations would go here:
        // if from_version < 2 { ... }

        Ok(())
    }

    /// Seed achievement catalog display rows (idempotent).
    fn seed_achievements(&self) -> Result<(), DatabaseError> {
        for achievement in definitions::catalog() {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO achievements
                         (id, name, description, category, points_reward, icon)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        achievement.id,
                        achievement.name,
                        achievement.description,
                        achievement.category.as_str(),
                        achievement.points_reward,
                        achievement.icon,
                    ],
                )
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction over the shared connection.
    ///
    /// Dropping the returned transaction without committing rolls it back.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>, DatabaseError> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))
    }

    // ========== User CRUD Operations ==========

    /// Create a user at signup.
    ///
    /// Usernames are unique case-insensitively; a collision is reported as
    /// a constraint violation.
    pub fn create_user(&self, username: &str) -> Result<UserRecord, DatabaseError> {
        let user = UserRecord::new(username.to_string());

        self.conn
            .execute(
                "INSERT INTO users
                     (id, username, points, calories_burned, time_active,
                      workouts_completed, experience, created_at, updated_at)
                 VALUES (?1, ?2, 0, 0, 0, 0, 0, ?3, ?4)",
                params![
                    user.id.to_string(),
                    user.username,
                    user.created_at.to_rfc3339(),
                    user.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DatabaseError::ConstraintViolation(format!("username '{username}' taken"))
                }
                other => DatabaseError::QueryFailed(other.to_string()),
            })?;

        Ok(user)
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: &Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, points, calories_burned, time_active,
                        workouts_completed, experience, created_at, updated_at
                 FROM users WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![id.to_string()], UserRow::from_row);

        match result {
            Ok(row) => Ok(Some(row.into_user()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get a user by username, case-insensitively.
    pub fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, points, calories_burned, time_active,
                        workouts_completed, experience, created_at, updated_at
                 FROM users WHERE username = ?1 COLLATE NOCASE",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![username], UserRow::from_row);

        match result {
            Ok(row) => Ok(Some(row.into_user()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }
}

/// Parse an RFC 3339 timestamp from storage.
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(e.to_string()))
}

/// Raw `users` row before parsing.
pub(crate) struct UserRow {
    id: String,
    username: String,
    points: i64,
    calories_burned: f64,
    time_active: f64,
    workouts_completed: u32,
    experience: i64,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            points: row.get(2)?,
            calories_burned: row.get(3)?,
            time_active: row.get(4)?,
            workouts_completed: row.get(5)?,
            experience: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    pub(crate) fn into_user(self) -> Result<UserRecord, DatabaseError> {
        Ok(UserRecord {
            id: Uuid::parse_str(&self.id)
                .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?,
            username: self.username,
            points: self.points as u64,
            calories_burned: self.calories_burned,
            time_active: self.time_active,
            workouts_completed: self.workouts_completed,
            experience: self.experience as u64,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
