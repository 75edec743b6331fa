//! Achievement catalog and evaluator.
//!
//! The catalog is static: every achievement is an id, display metadata and
//! an unlock rule over aggregate user stats. The evaluator compares the
//! catalog against a post-update stats snapshot and records newly earned
//! achievements exactly once.

pub mod definitions;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::games::types::GameType;
use crate::storage::game_store::GameStore;
use crate::storage::DatabaseError;

/// Achievement grouping for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    /// First-time milestones
    Beginner,
    /// Consecutive-day streaks
    Streak,
    /// Single-game score thresholds
    Performance,
    /// Holding an exercise over time
    Endurance,
    /// Strength exercise thresholds
    Strength,
    /// Lifetime play-count milestones
    Milestone,
    /// Lifetime calorie milestones
    Fitness,
}

impl AchievementCategory {
    /// Storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementCategory::Beginner => "beginner",
            AchievementCategory::Streak => "streak",
            AchievementCategory::Performance => "performance",
            AchievementCategory::Endurance => "endurance",
            AchievementCategory::Strength => "strength",
            AchievementCategory::Milestone => "milestone",
            AchievementCategory::Fitness => "fitness",
        }
    }

    /// Parse a storage name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(AchievementCategory::Beginner),
            "streak" => Some(AchievementCategory::Streak),
            "performance" => Some(AchievementCategory::Performance),
            "endurance" => Some(AchievementCategory::Endurance),
            "strength" => Some(AchievementCategory::Strength),
            "milestone" => Some(AchievementCategory::Milestone),
            "fitness" => Some(AchievementCategory::Fitness),
            _ => None,
        }
    }
}

/// Predicate deciding when an achievement unlocks.
///
/// Rules are evaluated against post-update aggregates, so an achievement
/// can be earned by the same session that satisfies it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnlockRule {
    /// Total finalized sessions across all game types reaches the threshold
    TotalGames(u32),
    /// Current consecutive-day streak reaches the threshold
    StreakDays(u32),
    /// Best score for one specific game reaches the threshold
    GameBestScore {
        /// Which game's best score is checked
        game: GameType,
        /// Required best score
        score: u32,
    },
    /// Lifetime calories burned reaches the threshold
    LifetimeCalories(f64),
}

impl UnlockRule {
    /// Whether the rule holds for the given stats snapshot.
    pub fn is_satisfied(&self, snapshot: &ProgressSnapshot) -> bool {
        match *self {
            UnlockRule::TotalGames(n) => snapshot.total_games >= n,
            UnlockRule::StreakDays(n) => snapshot.current_streak >= n,
            UnlockRule::GameBestScore { game, score } => {
                snapshot.best_scores.get(&game).copied().unwrap_or(0) >= score
            }
            UnlockRule::LifetimeCalories(threshold) => snapshot.lifetime_calories >= threshold,
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    /// Stable identifier (e.g. `streak_7`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Presentation grouping
    pub category: AchievementCategory,
    /// Points granted if the caller credits this achievement
    pub points_reward: u32,
    /// Icon name
    pub icon: String,
    /// When this achievement unlocks
    #[serde(skip)]
    pub rule: UnlockRule,
}

impl Achievement {
    /// Create a catalog entry.
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        category: AchievementCategory,
        points_reward: u32,
        icon: &str,
        rule: UnlockRule,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            points_reward,
            icon: icon.to_string(),
            rule,
        }
    }
}

/// An achievement a user has earned, with display fields for history views.
#[derive(Debug, Clone, Serialize)]
pub struct EarnedAchievement {
    /// Catalog id
    pub achievement_id: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Presentation grouping
    pub category: AchievementCategory,
    /// Points granted if credited
    pub points_reward: u32,
    /// Icon name
    pub icon: String,
    /// When the user earned it
    pub earned_at: DateTime<Utc>,
}

/// Post-update aggregate stats an unlock rule can reference.
#[derive(Debug, Clone, Default)]
pub struct ProgressSnapshot {
    /// Finalized sessions across all game types
    pub total_games: u32,
    /// Current consecutive-day streak
    pub current_streak: u32,
    /// Best score per game type
    pub best_scores: HashMap<GameType, u32>,
    /// Lifetime calories burned
    pub lifetime_calories: f64,
}

/// Catalog entries whose rules hold for `snapshot` and are not yet earned.
pub fn qualifying<'a>(
    catalog: &'a [Achievement],
    earned: &HashSet<String>,
    snapshot: &ProgressSnapshot,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| !earned.contains(&a.id) && a.rule.is_satisfied(snapshot))
        .collect()
}

/// Evaluates the achievement catalog against user progress.
pub struct AchievementEvaluator {
    catalog: Vec<Achievement>,
}

impl Default for AchievementEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl AchievementEvaluator {
    /// Evaluator over the built-in catalog.
    pub fn new() -> Self {
        Self {
            catalog: definitions::catalog(),
        }
    }

    /// The full catalog.
    pub fn catalog(&self) -> &[Achievement] {
        &self.catalog
    }

    /// Determine and record newly earned achievements for a user.
    ///
    /// Loads the already-earned set, checks every remaining rule against
    /// the snapshot, and records each hit with `earned_at = now`. Running
    /// this again with the same state returns an empty list. Intended to
    /// run inside the finalization transaction so unlocks commit (or roll
    /// back) together with the ledger update that triggered them.
    pub fn evaluate(
        &self,
        store: &GameStore<'_>,
        user_id: Uuid,
        snapshot: &ProgressSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Vec<Achievement>, DatabaseError> {
        let earned = store.earned_achievement_ids(user_id)?;

        let mut newly_earned = Vec::new();
        for achievement in qualifying(&self.catalog, &earned, snapshot) {
            store.record_achievement(user_id, &achievement.id, now)?;
            tracing::info!(
                user_id = %user_id,
                achievement = %achievement.id,
                "achievement unlocked"
            );
            newly_earned.push(achievement.clone());
        }

        Ok(newly_earned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(total_games: u32, streak: u32, calories: f64) -> ProgressSnapshot {
        ProgressSnapshot {
            total_games,
            current_streak: streak,
            best_scores: HashMap::new(),
            lifetime_calories: calories,
        }
    }

    #[test]
    fn test_total_games_rule() {
        let rule = UnlockRule::TotalGames(100);
        assert!(!rule.is_satisfied(&snapshot_with(99, 0, 0.0)));
        assert!(rule.is_satisfied(&snapshot_with(100, 0, 0.0)));
    }

    #[test]
    fn test_best_score_rule_missing_game_stat() {
        let rule = UnlockRule::GameBestScore {
            game: GameType::SquatTap,
            score: 100,
        };
        // No stats recorded for the game yet
        assert!(!rule.is_satisfied(&snapshot_with(5, 1, 0.0)));

        let mut snapshot = snapshot_with(5, 1, 0.0);
        snapshot.best_scores.insert(GameType::SquatTap, 100);
        assert!(rule.is_satisfied(&snapshot));
    }

    #[test]
    fn test_qualifying_skips_earned() {
        let catalog = definitions::catalog();
        let snapshot = snapshot_with(1, 1, 0.0);

        let first = qualifying(&catalog, &HashSet::new(), &snapshot);
        assert!(first.iter().any(|a| a.id == "first_game"));

        let earned: HashSet<String> = first.iter().map(|a| a.id.clone()).collect();
        let second = qualifying(&catalog, &earned, &snapshot);
        assert!(second.is_empty());
    }

    #[test]
    fn test_streak_thresholds() {
        let catalog = definitions::catalog();
        let earned = HashSet::new();

        let ids = |streak: u32| -> Vec<String> {
            qualifying(&catalog, &earned, &snapshot_with(0, streak, 0.0))
                .iter()
                .map(|a| a.id.clone())
                .collect()
        };

        assert!(!ids(2).contains(&"streak_3".to_string()));
        assert!(ids(3).contains(&"streak_3".to_string()));
        assert!(ids(7).contains(&"streak_7".to_string()));
        assert!(ids(30).contains(&"streak_30".to_string()));
    }
}
