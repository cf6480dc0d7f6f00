//! Injectable randomness
//!
//! Every random decision in the engine (crit rolls, effect procs) draws from a
//! `RandomSource` handed in by the caller, never from a global.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// A source of uniform draws in [0, 1)
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Seeded PCG32 source for real play (reproducible from its seed)
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    rng: Pcg32,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRng {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of rolls, then repeats the fallback forever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedRolls {
    rolls: Vec<f64>,
    cursor: usize,
    fallback: f64,
}

impl ScriptedRolls {
    /// Rolls are consumed in order; once exhausted every draw returns 0.99
    /// (high enough to miss any proc below 99%).
    pub fn new(rolls: &[f64]) -> Self {
        Self::with_fallback(rolls, 0.99)
    }

    pub fn with_fallback(rolls: &[f64], fallback: f64) -> Self {
        Self {
            rolls: rolls.to_vec(),
            cursor: 0,
            fallback,
        }
    }

    /// Number of draws taken so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRolls {
    fn next_unit(&mut self) -> f64 {
        let roll = self.rolls.get(self.cursor).copied().unwrap_or(self.fallback);
        self.cursor += 1;
        roll
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}
