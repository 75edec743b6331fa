//! Achievement definitions.

use super::{Achievement, AchievementCategory, UnlockRule};
use crate::games::types::GameType;

/// The full achievement catalog.
pub fn catalog() -> Vec<Achievement> {
    let mut achievements = Vec::new();

    achievements.push(Achievement::new(
        "first_game",
        "First Steps",
        "Play your first fitness game",
        AchievementCategory::Beginner,
        10,
        "fa-star",
        UnlockRule::TotalGames(1),
    ));

    achievements.extend(streak_achievements());
    achievements.extend(performance_achievements());
    achievements.extend(milestone_achievements());

    achievements
}

fn streak_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "streak_3",
            "Consistent Player",
            "Play games for 3 days in a row",
            AchievementCategory::Streak,
            25,
            "fa-fire",
            UnlockRule::StreakDays(3),
        ),
        Achievement::new(
            "streak_7",
            "Week Warrior",
            "Play games for 7 days in a row",
            AchievementCategory::Streak,
            75,
            "fa-medal",
            UnlockRule::StreakDays(7),
        ),
        Achievement::new(
            "streak_30",
            "Monthly Master",
            "Play games for 30 days in a row",
            AchievementCategory::Streak,
            300,
            "fa-crown",
            UnlockRule::StreakDays(30),
        ),
    ]
}

fn performance_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "squat_master",
            "Squat Master",
            "Score 100+ in Squat Tap Challenge",
            AchievementCategory::Performance,
            50,
            "fa-arrows-alt-v",
            UnlockRule::GameBestScore {
                game: GameType::SquatTap,
                score: 100,
            },
        ),
        Achievement::new(
            "jump_champion",
            "Jump Champion",
            "Score 50+ in Jump Counter",
            AchievementCategory::Performance,
            40,
            "fa-arrow-up",
            UnlockRule::GameBestScore {
                game: GameType::JumpCounter,
                score: 50,
            },
        ),
        Achievement::new(
            "plank_pro",
            "Plank Pro",
            "Hold plank for 120+ seconds",
            AchievementCategory::Endurance,
            60,
            "fa-clock",
            UnlockRule::GameBestScore {
                game: GameType::PlankTimer,
                score: 120,
            },
        ),
        Achievement::new(
            "burpee_beast",
            "Burpee Beast",
            "Complete 25+ burpees",
            AchievementCategory::Strength,
            80,
            "fa-dumbbell",
            UnlockRule::GameBestScore {
                game: GameType::BurpeeChallenge,
                score: 25,
            },
        ),
    ]
}

fn milestone_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "game_addict",
            "Game Addict",
            "Play 100 games total",
            AchievementCategory::Milestone,
            200,
            "fa-gamepad",
            UnlockRule::TotalGames(100),
        ),
        Achievement::new(
            "calorie_burner",
            "Calorie Burner",
            "Burn 1000+ total calories",
            AchievementCategory::Fitness,
            150,
            "fa-fire-alt",
            UnlockRule::LifetimeCalories(1000.0),
        ),
    ]
}
