//! Daily activity streak tracking.
//!
//! A streak counts consecutive calendar days with at least one finalized
//! session. Day arithmetic uses calendar dates, not wall-clock hours, so
//! a session at 23:59 followed by one at 00:01 still extends the streak.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-user streak state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive calendar days with activity, ending at `last_activity_date`
    pub current_streak: u32,
    /// Longest streak ever reached
    pub longest_streak: u32,
    /// Most recent activity date
    pub last_activity_date: Option<NaiveDate>,
}

impl StreakState {
    /// Fresh state for a user with no recorded activity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finalized session on `today`.
    ///
    /// Must be called at most once per finalized session; a repeat call for
    /// the same session would miscount a same-day play as a next-day one.
    /// Same-day repeats leave the streak unchanged, a one-day gap extends
    /// it, and anything longer resets it to 1.
    pub fn record_activity(&mut self, today: NaiveDate) {
        match self.last_activity_date {
            None => self.current_streak = 1,
            Some(last) => {
                let days = (today - last).num_days();
                if days == 1 {
                    self.current_streak += 1;
                } else if days > 1 {
                    self.current_streak = 1;
                } else {
                    // Same day (or a backdated report): streak holds, but a
                    // user with recorded activity always has at least 1
                    self.current_streak = self.current_streak.max(1);
                }
            }
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_activity_date = Some(today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_first_activity_starts_streak() {
        let mut state = StreakState::new();
        state.record_activity(day(1));
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 1);
        assert_eq!(state.last_activity_date, Some(day(1)));
    }

    #[test]
    fn test_next_day_extends() {
        let mut state = StreakState::new();
        state.record_activity(day(1));
        state.record_activity(day(2));
        assert_eq!(state.current_streak, 2);
        assert_eq!(state.longest_streak, 2);
    }

    #[test]
    fn test_same_day_does_not_inflate() {
        let mut state = StreakState::new();
        state.record_activity(day(1));
        state.record_activity(day(1));
        state.record_activity(day(1));
        assert_eq!(state.current_streak, 1);
    }

    #[test]
    fn test_gap_resets_to_one() {
        let mut state = StreakState::new();
        state.record_activity(day(1));
        state.record_activity(day(2));
        state.record_activity(day(5));
        assert_eq!(state.current_streak, 1);
        // Longest remembers the old run
        assert_eq!(state.longest_streak, 2);
    }

    #[test]
    fn test_longest_never_below_current() {
        let mut state = StreakState::new();
        for d in 1..=7 {
            state.record_activity(day(d));
        }
        assert_eq!(state.current_streak, 7);
        assert_eq!(state.longest_streak, 7);

        state.record_activity(day(20));
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 7);
        assert!(state.longest_streak >= state.current_streak);
    }

    #[test]
    fn test_last_activity_date_always_updates() {
        let mut state = StreakState::new();
        state.record_activity(day(1));
        state.record_activity(day(9));
        assert_eq!(state.last_activity_date, Some(day(9)));
    }
}
