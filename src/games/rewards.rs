//! Reward calculator: converts (game type, score, duration) into points
//! and calories.
//!
//! Pure and deterministic; identical inputs always produce identical
//! outputs so a retried finalization computes the same deltas. Callers
//! clamp malformed/negative scores to 0 before invoking.

use super::types::GameType;

/// Sessions longer than this earn the duration bonus.
pub const DURATION_BONUS_THRESHOLD_MINUTES: f64 = 5.0;

/// Multiplier applied to points for long sessions.
const DURATION_POINTS_BONUS: f64 = 1.2;

/// Multiplier applied to calories for long sessions.
const DURATION_CALORIES_BONUS: f64 = 1.1;

/// Per-score-unit reward multipliers for one game type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardRates {
    /// Points earned per score unit
    pub points_per_unit: f64,
    /// Calories burned per score unit
    pub calories_per_unit: f64,
}

/// Reward multipliers for a game type.
///
/// Unrecognized types fall back to a conservative default pair rather
/// than failing.
pub fn reward_rates(game_type: GameType) -> RewardRates {
    match game_type {
        GameType::SquatTap => RewardRates {
            points_per_unit: 2.0,
            calories_per_unit: 0.5,
        },
        GameType::JumpCounter => RewardRates {
            points_per_unit: 3.0,
            calories_per_unit: 0.8,
        },
        GameType::PlankTimer => RewardRates {
            points_per_unit: 5.0,
            calories_per_unit: 0.1,
        },
        GameType::BurpeeChallenge => RewardRates {
            points_per_unit: 10.0,
            calories_per_unit: 1.5,
        },
        GameType::Other => RewardRates {
            points_per_unit: 1.0,
            calories_per_unit: 0.3,
        },
    }
}

/// Computed rewards for one finalized session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    /// Points earned
    pub points: u64,
    /// Calories burned, rounded to 2 decimal places
    pub calories: f64,
}

/// Compute points and calories for a finalized session.
///
/// points = floor(score × points_multiplier), calories = score ×
/// calories_multiplier. Sessions longer than five minutes earn a single
/// duration bonus: points × 1.2 (floored again) and calories × 1.1. The
/// calorie result is rounded to 2 decimal places.
pub fn compute_rewards(game_type: GameType, score: u32, duration_minutes: f64) -> Rewards {
    let rates = reward_rates(game_type);

    let mut points = (f64::from(score) * rates.points_per_unit).floor();
    let mut calories = f64::from(score) * rates.calories_per_unit;

    // Duration bonus, applied at most once
    if duration_minutes > DURATION_BONUS_THRESHOLD_MINUTES {
        points = (points * DURATION_POINTS_BONUS).floor();
        calories *= DURATION_CALORIES_BONUS;
    }

    Rewards {
        points: points as u64,
        calories: round2(calories),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
