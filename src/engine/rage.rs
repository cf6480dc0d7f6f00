//! Rage mode trigger
//!
//! A burst of quick taps switches rage on for a fixed duration. While rage is
//! running further bursts don't extend it.

use crate::tuning::RageTuning;
use crate::Millis;

#[derive(Debug, Clone)]
pub struct RageMeter {
    tuning: RageTuning,
    burst: u32,
    last_tap: Option<Millis>,
    /// Rage stays on until this instant
    active_until: Option<Millis>,
}

impl Default for RageMeter {
    fn default() -> Self {
        Self::new(RageTuning::default())
    }
}

impl RageMeter {
    pub fn new(tuning: RageTuning) -> Self {
        Self {
            tuning,
            burst: 0,
            last_tap: None,
            active_until: None,
        }
    }

    /// Count a tap toward the current burst. Returns true when this tap
    /// switched rage on.
    pub fn register_tap(&mut self, now: Millis) -> bool {
        let quick = self
            .last_tap
            .map(|last| now.saturating_sub(last) < self.tuning.burst_gap_ms)
            .unwrap_or(false);

        self.burst = if quick { self.burst.saturating_add(1) } else { 1 };
        self.last_tap = Some(now);

        if self.burst >= self.tuning.burst_taps && !self.is_active(now) {
            self.active_until = Some(now.saturating_add(self.tuning.duration_ms));
            log::info!("Rage mode on for {} ms", self.tuning.duration_ms);
            return true;
        }
        false
    }

    pub fn is_active(&self, now: Millis) -> bool {
        self.active_until.is_some_and(|until| now < until)
    }

    /// Milliseconds of rage left (0 when inactive)
    pub fn remaining_ms(&self, now: Millis) -> Millis {
        self.active_until
            .map(|until| until.saturating_sub(now))
            .unwrap_or(0)
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    pub fn clear(&mut self) {
        self.burst = 0;
        self.last_tap = None;
        self.active_until = None;
    }
}
