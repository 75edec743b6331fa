//! Static mini-game catalog: display metadata and client configuration.

use serde::Serialize;

use super::rewards::{reward_rates, RewardRates};
use super::types::GameType;

/// Presentation and client-side configuration for one mini-game.
#[derive(Debug, Clone, Serialize)]
pub struct GameDefinition {
    /// Which game this describes
    pub game_type: GameType,
    /// Display name
    pub name: &'static str,
    /// Short description for game selection screens
    pub description: &'static str,
    /// Icon name
    pub icon: &'static str,
    /// Score a player should aim for in one session
    pub target_score: u32,
    /// Client-enforced session length in seconds
    pub time_limit_secs: u32,
}

impl GameDefinition {
    /// Reward multipliers for this game, for display next to the rules.
    pub fn reward_rates(&self) -> RewardRates {
        reward_rates(self.game_type)
    }
}

/// All playable games with their display metadata.
pub fn game_catalog() -> Vec<GameDefinition> {
    vec![
        GameDefinition {
            game_type: GameType::SquatTap,
            name: "Squat Tap Challenge",
            description: "Tap the screen while doing squats!",
            icon: "fa-arrows-alt-v",
            target_score: 50,
            time_limit_secs: 60,
        },
        GameDefinition {
            game_type: GameType::JumpCounter,
            name: "Jump Counter",
            description: "Jump and tap to count your jumps!",
            icon: "fa-arrow-up",
            target_score: 30,
            time_limit_secs: 60,
        },
        GameDefinition {
            game_type: GameType::PlankTimer,
            name: "Plank Timer",
            description: "Hold your plank and beat the timer!",
            icon: "fa-clock",
            target_score: 60,
            time_limit_secs: 300,
        },
        GameDefinition {
            game_type: GameType::BurpeeChallenge,
            name: "Burpee Challenge",
            description: "Complete as many burpees as you can!",
            icon: "fa-dumbbell",
            target_score: 25,
            time_limit_secs: 120,
        },
    ]
}
