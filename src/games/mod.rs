//! Exercise mini-game domain: session lifecycle, rewards and streaks.

pub mod catalog;
pub mod rewards;
pub mod session;
pub mod streaks;
pub mod types;

pub use catalog::{game_catalog, GameDefinition};
pub use rewards::{compute_rewards, RewardRates, Rewards};
pub use session::{SessionError, SessionManager};
pub use streaks::StreakState;
pub use types::{GameSession, GameType, SessionSummary, TrackingMethod, TrackingSample};
