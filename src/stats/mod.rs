//! Read-only reporting: leaderboards and user stats overviews.

pub mod leaderboard;
pub mod overview;

pub use leaderboard::{LeaderboardEntry, LeaderboardError, LeaderboardService};
pub use overview::{StatsError, StatsService, UserStatsReport};
