//! Tap Vent - progression and reward engine for a tap-to-vent clicker
//!
//! Core modules:
//! - `engine`: Deterministic scoring (combo, damage, effects, unlocks)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Key-value save/load of player progress
//! - `platform`: Clock and storage backends for browser/native
//! - `sync`: Outbox of score and achievement updates for a remote backend

pub mod engine;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod sync;
pub mod tuning;

pub use engine::{Catalog, TapEngine, TapInput, TapOutcome};
pub use error::{CatalogError, StorageError, TuningError};
pub use tuning::Tuning;

/// Milliseconds on the host's monotonic-ish wall clock
pub type Millis = u64;

/// Game configuration constants
pub mod consts {
    /// A tap later than this after the previous one starts a new streak
    pub const COMBO_IDLE_WINDOW_MS: u64 = 1000;
    /// Probability that a tap lands as a critical hit
    pub const CRIT_CHANCE: f64 = 0.15;
    pub const CRIT_FACTOR: f64 = 2.0;
    pub const RAGE_FACTOR: f64 = 2.0;
}
