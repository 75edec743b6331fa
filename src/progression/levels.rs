//! Level math over lifetime experience.

/// Experience required per level.
pub const XP_PER_LEVEL: u64 = 1000;

/// Level for a lifetime experience total: floor(xp / 1000) + 1.
pub fn level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL) as u32 + 1
}

/// Total experience at which the next level is reached.
pub fn xp_for_next_level(level: u32) -> u64 {
    u64::from(level) * XP_PER_LEVEL
}

/// Progress within the current level, 0.0..1.0.
pub fn level_progress(xp: u64) -> f32 {
    let xp_in_level = xp % XP_PER_LEVEL;
    xp_in_level as f32 / XP_PER_LEVEL as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(999), 1);
        assert_eq!(level_for_xp(1000), 2);
        assert_eq!(level_for_xp(1999), 2);
        assert_eq!(level_for_xp(2000), 3);
    }

    #[test]
    fn test_xp_for_next_level() {
        assert_eq!(xp_for_next_level(1), 1000);
        assert_eq!(xp_for_next_level(5), 5000);
    }

    #[test]
    fn test_level_progress() {
        assert!((level_progress(0) - 0.0).abs() < f32::EPSILON);
        assert!((level_progress(500) - 0.5).abs() < 0.001);
        // Progress wraps at each level boundary
        assert!((level_progress(1000) - 0.0).abs() < f32::EPSILON);
        assert!((level_progress(1250) - 0.25).abs() < 0.001);
    }
}
