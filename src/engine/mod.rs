//! Progression engine
//!
//! All scoring and unlock logic lives here. This module must be pure and
//! deterministic:
//! - Time comes in as a `Millis` argument, never read from a clock
//! - Randomness only through an injected `RandomSource`
//! - Stable evaluation order (catalog order)
//! - No storage, network or rendering dependencies

pub mod catalog;
pub mod combo;
pub mod damage;
pub mod effects;
pub mod progress;
pub mod rage;
pub mod rng;
pub mod tap;

pub use catalog::{
    Achievement, Catalog, ConditionKind, SpecialUnlock, SpecialWeapon, Weapon, WeaponEffect,
    Wieldable,
};
pub use combo::{ComboState, ComboTracker, bracket_multiplier, combo_multiplier};
pub use damage::{resolve_damage, roll_critical};
pub use effects::{EffectContext, EffectEvent, EffectOutcome, apply_effect, combo_accumulate_scale};
pub use progress::{
    AchievementProgress, AchievementRecord, AchievementState, CumulativeStats, ProgressTracker,
    UnlockEvent, UnlockKind, UnlockStatus,
};
pub use rage::RageMeter;
pub use rng::{RandomSource, ScriptedRolls, SeededRng};
pub use tap::{TapEngine, TapInput, TapOutcome, UnlockQueue};
