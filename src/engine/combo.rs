//! Consecutive-tap streak tracking
//!
//! A streak grows while taps keep landing inside the idle window and drops
//! back to 1 on the first tap after a longer gap. The tracker never reads a
//! clock itself: every call carries `now`.

use serde::{Deserialize, Serialize};

use crate::consts::COMBO_IDLE_WINDOW_MS;
use crate::tuning::{ComboBracket, STANDARD_COMBO_BRACKETS};
use crate::Millis;

/// Multiplier for a streak using the standard bracket table
pub fn combo_multiplier(streak: u32) -> f64 {
    bracket_multiplier(&STANDARD_COMBO_BRACKETS, streak)
}

/// Multiplier of the highest bracket whose `min_streak` the streak reaches
pub fn bracket_multiplier(brackets: &[ComboBracket], streak: u32) -> f64 {
    brackets
        .iter()
        .rev()
        .find(|b| streak >= b.min_streak)
        .map(|b| b.multiplier)
        .unwrap_or(1.0)
}

/// Per-session streak state (never persisted mid-streak)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboState {
    pub streak_count: u32,
    /// Timestamp of the most recent tap (None before the first tap)
    pub last_tap: Option<Millis>,
}

/// Streak tracker with a configurable idle window and multiplier table
#[derive(Debug, Clone)]
pub struct ComboTracker {
    state: ComboState,
    idle_window_ms: Millis,
    brackets: Vec<ComboBracket>,
}

impl Default for ComboTracker {
    fn default() -> Self {
        Self::new(COMBO_IDLE_WINDOW_MS, STANDARD_COMBO_BRACKETS.to_vec())
    }
}

impl ComboTracker {
    pub fn new(idle_window_ms: Millis, brackets: Vec<ComboBracket>) -> Self {
        Self {
            state: ComboState::default(),
            idle_window_ms,
            brackets,
        }
    }

    /// Register a tap at `now`, returning the new streak
    pub fn register_tap(&mut self, now: Millis) -> u32 {
        let within_window = self
            .state
            .last_tap
            // A clock that steps backwards counts as a zero gap
            .map(|last| now.saturating_sub(last) <= self.idle_window_ms)
            .unwrap_or(false);

        self.state.streak_count = if within_window {
            self.state.streak_count.saturating_add(1)
        } else {
            1
        };
        self.state.last_tap = Some(now);
        self.state.streak_count
    }

    /// Drop the streak to 0 if the idle window has passed without a tap.
    /// Returns true only when a reset actually happened.
    pub fn check_idle_reset(&mut self, now: Millis) -> bool {
        if self.state.streak_count == 0 {
            return false;
        }
        let expired = self
            .state
            .last_tap
            .map(|last| now.saturating_sub(last) > self.idle_window_ms)
            .unwrap_or(true);

        if expired {
            log::debug!("Combo of {} expired", self.state.streak_count);
            self.state.streak_count = 0;
        }
        expired
    }

    pub fn streak(&self) -> u32 {
        self.state.streak_count
    }

    pub fn current_multiplier(&self) -> f64 {
        bracket_multiplier(&self.brackets, self.state.streak_count)
    }

    pub fn state(&self) -> ComboState {
        self.state
    }

    /// Forget the streak entirely (session restart)
    pub fn clear(&mut self) {
        self.state = ComboState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_multiplier_brackets() {
        let expected = [
            (0, 1.0),
            (4, 1.0),
            (5, 1.2),
            (9, 1.2),
            (10, 1.5),
            (19, 1.5),
            (20, 2.0),
            (29, 2.0),
            (30, 2.5),
            (49, 2.5),
            (50, 3.0),
            (500, 3.0),
        ];
        for (streak, multiplier) in expected {
            assert_eq!(combo_multiplier(streak), multiplier, "streak {}", streak);
        }
    }

    #[test]
    fn test_rapid_taps_build_streak() {
        let mut combo = ComboTracker::default();
        for i in 0..22u64 {
            combo.register_tap(1_000 + i * 200);
        }
        assert_eq!(combo.streak(), 22);
        assert_eq!(combo.current_multiplier(), 2.0);
    }

    #[test]
    fn test_gap_exactly_window_keeps_streak() {
        let mut combo = ComboTracker::default();
        combo.register_tap(0);
        assert_eq!(combo.register_tap(1_000), 2);
        assert_eq!(combo.register_tap(2_001), 1);
    }

    #[test]
    fn test_first_tap_starts_at_one() {
        let mut combo = ComboTracker::default();
        assert_eq!(combo.register_tap(123_456), 1);
        assert_eq!(combo.state().last_tap, Some(123_456));
    }

    #[test]
    fn test_backwards_clock_extends_streak() {
        let mut combo = ComboTracker::default();
        combo.register_tap(5_000);
        assert_eq!(combo.register_tap(4_000), 2);
    }

    #[test]
    fn test_idle_reset() {
        let mut combo = ComboTracker::default();
        combo.register_tap(0);
        combo.register_tap(500);

        assert!(!combo.check_idle_reset(1_500));
        assert_eq!(combo.streak(), 2);

        assert!(combo.check_idle_reset(1_501));
        assert_eq!(combo.streak(), 0);
        assert_eq!(combo.current_multiplier(), 1.0);

        // Nothing left to reset
        assert!(!combo.check_idle_reset(10_000));
    }

    #[test]
    fn test_custom_window() {
        let mut combo = ComboTracker::new(100, STANDARD_COMBO_BRACKETS.to_vec());
        combo.register_tap(0);
        assert_eq!(combo.register_tap(150), 1);
    }

    proptest! {
        #[test]
        fn prop_multiplier_monotonic(a in 0u32..10_000, b in 0u32..10_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(combo_multiplier(lo) <= combo_multiplier(hi));
        }

        #[test]
        fn prop_long_gap_resets_to_one(
            taps in 1usize..60,
            gap in (COMBO_IDLE_WINDOW_MS + 1)..1_000_000u64,
        ) {
            let mut combo = ComboTracker::default();
            let mut now = 10_000;
            for _ in 0..taps {
                now += 100;
                combo.register_tap(now);
            }
            prop_assert_eq!(combo.register_tap(now + gap), 1);
        }
    }
}
