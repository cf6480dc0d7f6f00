//! Data-driven game balance
//!
//! Every number the engine uses to turn taps into damage lives here, with
//! defaults matching the shipped game. Tuning can be loaded from JSON so
//! balance passes don't need a rebuild.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// One step of the combo multiplier table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboBracket {
    /// Smallest streak that earns this multiplier
    pub min_streak: u32,
    /// Damage multiplier for streaks in this bracket
    pub multiplier: f64,
}

impl ComboBracket {
    pub const fn new(min_streak: u32, multiplier: f64) -> Self {
        Self {
            min_streak,
            multiplier,
        }
    }
}

/// Standard combo table: 0-4 x1.0, 5-9 x1.2, 10-19 x1.5, 20-29 x2.0, 30-49 x2.5, 50+ x3.0
pub const STANDARD_COMBO_BRACKETS: [ComboBracket; 6] = [
    ComboBracket::new(0, 1.0),
    ComboBracket::new(5, 1.2),
    ComboBracket::new(10, 1.5),
    ComboBracket::new(20, 2.0),
    ComboBracket::new(30, 2.5),
    ComboBracket::new(50, 3.0),
];

/// Rage mode trigger parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RageTuning {
    /// Max gap between taps (ms) that keeps a burst going
    pub burst_gap_ms: u64,
    /// Taps in one burst needed to trigger rage
    pub burst_taps: u32,
    /// How long rage lasts once triggered (ms)
    pub duration_ms: u64,
}

impl Default for RageTuning {
    fn default() -> Self {
        Self {
            burst_gap_ms: 500,
            burst_taps: 10,
            duration_ms: 5000,
        }
    }
}

/// Engine balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Gap (ms) after which a tap no longer extends the combo
    pub idle_window_ms: u64,
    /// Probability that a tap is a critical hit
    pub crit_chance: f64,
    /// Combo multiplier table, sorted by `min_streak`
    pub combo_brackets: Vec<ComboBracket>,
    /// Rage burst detection
    #[serde(default)]
    pub rage: RageTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            idle_window_ms: crate::consts::COMBO_IDLE_WINDOW_MS,
            crit_chance: crate::consts::CRIT_CHANCE,
            combo_brackets: STANDARD_COMBO_BRACKETS.to_vec(),
            rage: RageTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning: idle window {} ms, crit chance {}, {} combo brackets",
            tuning.idle_window_ms,
            tuning.crit_chance,
            tuning.combo_brackets.len()
        );
        Ok(tuning)
    }

    /// Serialize to pretty JSON (for balance editing)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check invariants the engine relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(0.0..=1.0).contains(&self.crit_chance) {
            return Err(TuningError::Invalid("crit_chance", "must be within [0, 1]"));
        }
        if self.idle_window_ms == 0 {
            return Err(TuningError::Invalid("idle_window_ms", "must be positive"));
        }

        let first = self
            .combo_brackets
            .first()
            .ok_or(TuningError::Invalid("combo_brackets", "must not be empty"))?;
        if first.min_streak != 0 {
            return Err(TuningError::Invalid(
                "combo_brackets",
                "first bracket must start at streak 0",
            ));
        }
        for pair in self.combo_brackets.windows(2) {
            if pair[1].min_streak <= pair[0].min_streak {
                return Err(TuningError::Invalid(
                    "combo_brackets",
                    "min_streak must be strictly increasing",
                ));
            }
            // Keeps the multiplier monotonic in streak
            if pair[1].multiplier < pair[0].multiplier {
                return Err(TuningError::Invalid(
                    "combo_brackets",
                    "multipliers must not decrease",
                ));
            }
        }
        if self
            .combo_brackets
            .iter()
            .any(|b| !b.multiplier.is_finite() || b.multiplier < 0.0)
        {
            return Err(TuningError::Invalid(
                "combo_brackets",
                "multipliers must be finite and non-negative",
            ));
        }

        if self.rage.burst_taps == 0 {
            return Err(TuningError::Invalid("rage.burst_taps", "must be positive"));
        }
        Ok(())
    }
}
