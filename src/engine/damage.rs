//! Per-tap damage resolution
//!
//! Deterministic given its inputs: crit and rage are decided by the caller.

use super::catalog::Wieldable;
use super::rng::RandomSource;
use crate::consts::{CRIT_FACTOR, RAGE_FACTOR};

/// Bernoulli crit draw: one roll, crit when `roll < chance`
pub fn roll_critical(rng: &mut impl RandomSource, chance: f64) -> bool {
    rng.next_unit() < chance
}

/// Final integer damage for one tap.
///
/// `floor(base * rage * combo)` where base is doubled on a crit and rage
/// doubles everything. Truncation is intentional.
pub fn resolve_damage(
    weapon: &(impl Wieldable + ?Sized),
    is_critical: bool,
    combo_multiplier: f64,
    rage_active: bool,
) -> u64 {
    let base = if is_critical {
        weapon.base_damage() as f64 * CRIT_FACTOR
    } else {
        weapon.base_damage() as f64
    };
    let rage_factor = if rage_active { RAGE_FACTOR } else { 1.0 };

    let multiplier = sanitize_multiplier(combo_multiplier);
    floor_to_damage(base * rage_factor * multiplier)
}

/// Negative or non-finite multipliers are a bug upstream; clamp them to zero
fn sanitize_multiplier(multiplier: f64) -> f64 {
    debug_assert!(
        multiplier.is_finite() && multiplier >= 0.0,
        "invalid combo multiplier {multiplier}"
    );
    if multiplier.is_finite() && multiplier >= 0.0 {
        multiplier
    } else {
        log::warn!("Clamping invalid combo multiplier {} to 0", multiplier);
        0.0
    }
}

/// Floor a raw damage value into the integer domain, clamping at zero
pub(crate) fn floor_to_damage(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw.floor() as u64
    } else {
        0
    }
}
