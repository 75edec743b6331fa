//! FitQuest - Gamified Fitness Progression Engine
//!
//! Converts raw exercise mini-game sessions (squat taps, jump counts, plank
//! timers) into durable user state: points, calories, levels, daily streaks
//! and achievements. Session orchestration, reward calculation, streak
//! tracking and achievement evaluation all commit through a single atomic
//! progression ledger backed by SQLite.

pub mod achievements;
pub mod games;
pub mod progression;
pub mod stats;
pub mod storage;

// Re-export commonly used types
pub use achievements::AchievementEvaluator;
pub use games::session::SessionManager;
pub use progression::ledger::ProgressionLedger;
pub use stats::leaderboard::LeaderboardService;
pub use stats::overview::StatsService;
pub use storage::{Database, DatabaseError};
