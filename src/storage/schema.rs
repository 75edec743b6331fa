//! Database schema definitions for FitQuest.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE COLLATE NOCASE,
    points INTEGER NOT NULL DEFAULT 0,
    calories_burned REAL NOT NULL DEFAULT 0,
    time_active REAL NOT NULL DEFAULT 0,
    workouts_completed INTEGER NOT NULL DEFAULT 0,
    experience INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Game sessions table
CREATE TABLE IF NOT EXISTS game_sessions (
    session_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    username TEXT NOT NULL,
    game_type TEXT NOT NULL,
    tracking_method TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    duration_minutes REAL,
    score INTEGER NOT NULL DEFAULT 0,
    points_earned INTEGER,
    calories_burned REAL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_game_sessions_user_id ON game_sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_game_sessions_end_time ON game_sessions(user_id, end_time);

-- Per-tick tracking samples table
CREATE TABLE IF NOT EXISTS tracking_samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES game_sessions(session_id) ON DELETE CASCADE,
    recorded_at TEXT NOT NULL,
    exercise_count INTEGER NOT NULL,
    confidence REAL NOT NULL,
    sensor_data_json TEXT
);

CREATE INDEX IF NOT EXISTS idx_tracking_samples_session_id ON tracking_samples(session_id);

-- Per (user, game type) aggregates
CREATE TABLE IF NOT EXISTS game_stats (
    user_id TEXT NOT NULL REFERENCES users(id),
    game_type TEXT NOT NULL,
    games_played INTEGER NOT NULL DEFAULT 0,
    best_score INTEGER NOT NULL DEFAULT 0,
    best_achieved_at TEXT,
    total_score INTEGER NOT NULL DEFAULT 0,
    average_score REAL NOT NULL DEFAULT 0,
    last_played TEXT,
    PRIMARY KEY (user_id, game_type)
);

-- Daily streaks table
CREATE TABLE IF NOT EXISTS user_streaks (
    user_id TEXT PRIMARY KEY REFERENCES users(id),
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_activity_date TEXT
);

-- Achievement catalog table (display rows; unlock rules live in code)
CREATE TABLE IF NOT EXISTS achievements (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    points_reward INTEGER NOT NULL,
    icon TEXT NOT NULL
);

-- Earned achievements table
CREATE TABLE IF NOT EXISTS user_achievements (
    user_id TEXT NOT NULL REFERENCES users(id),
    achievement_id TEXT NOT NULL REFERENCES achievements(id),
    earned_at TEXT NOT NULL,
    PRIMARY KEY (user_id, achievement_id)
);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
