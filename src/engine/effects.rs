//! Weapon special effects
//!
//! Each effect may add bonus damage on top of the resolved hit and describes
//! what happened with an `EffectEvent` for the presentation layer to animate.

use serde::{Deserialize, Serialize};

use super::catalog::{WeaponEffect, Wieldable};
use super::damage::floor_to_damage;
use super::rng::RandomSource;

/// Streak at which `ComboAccumulate` reaches its cap
pub const COMBO_ACCUMULATE_FULL_STREAK: f64 = 50.0;

/// Everything an effect can look at for the current tap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectContext {
    /// Damage after crit/rage/combo
    pub resolved_damage: u64,
    /// The weapon's unmodified base damage
    pub base_damage: u32,
    pub is_critical: bool,
    pub combo_streak: u32,
}

/// Something the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectEvent {
    MultiHit { count: u32, scale: f64 },
    AreaDamage { radius: f32, scale: f64 },
    CritBoost { scale: f64 },
    ComboAccumulate { scale: f64 },
}

impl EffectEvent {
    /// Short caption for floating text
    pub fn label(&self) -> String {
        match self {
            EffectEvent::MultiHit { count, .. } => format!("{} hit combo!", count),
            EffectEvent::AreaDamage { .. } => "Area blast!".to_string(),
            EffectEvent::CritBoost { .. } => "Crit boost!".to_string(),
            EffectEvent::ComboAccumulate { scale } => format!("x{:.2} combo bonus", scale),
        }
    }
}

/// Bonus damage and events produced by one effect evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectOutcome {
    pub bonus_damage: u64,
    pub events: Vec<EffectEvent>,
}

impl EffectOutcome {
    fn single(bonus_damage: u64, event: EffectEvent) -> Self {
        Self {
            bonus_damage,
            events: vec![event],
        }
    }
}

/// Evaluate a weapon's effect for one tap.
///
/// Proc effects consume exactly one roll and trigger when `roll < proc_chance`.
/// `CritBoost` consumes no roll on a non-critical tap; `ComboAccumulate` and
/// `None` never roll.
pub fn apply_effect(
    weapon: &(impl Wieldable + ?Sized),
    ctx: &EffectContext,
    rng: &mut impl RandomSource,
) -> EffectOutcome {
    match *weapon.effect() {
        WeaponEffect::None => EffectOutcome::default(),

        WeaponEffect::MultiHit {
            proc_chance,
            extra_hit_count,
            damage_scale,
        } => {
            if rng.next_unit() >= proc_chance {
                return EffectOutcome::default();
            }
            let bonus =
                floor_to_damage(ctx.base_damage as f64 * damage_scale * extra_hit_count as f64);
            EffectOutcome::single(
                bonus,
                EffectEvent::MultiHit {
                    count: extra_hit_count,
                    scale: damage_scale,
                },
            )
        }

        // Procs independently of crit
        WeaponEffect::AreaDamage {
            proc_chance,
            radius,
            damage_scale,
        } => {
            if rng.next_unit() >= proc_chance {
                return EffectOutcome::default();
            }
            let bonus = floor_to_damage(ctx.base_damage as f64 * damage_scale);
            EffectOutcome::single(
                bonus,
                EffectEvent::AreaDamage {
                    radius,
                    scale: damage_scale,
                },
            )
        }

        WeaponEffect::CritBoost {
            proc_chance,
            damage_scale,
        } => {
            if !ctx.is_critical || rng.next_unit() >= proc_chance {
                return EffectOutcome::default();
            }
            let bonus = floor_to_damage(ctx.resolved_damage as f64 * damage_scale);
            EffectOutcome::single(bonus, EffectEvent::CritBoost { scale: damage_scale })
        }

        WeaponEffect::ComboAccumulate { max_scale } => {
            let scale = combo_accumulate_scale(ctx.combo_streak, max_scale);
            let bonus = floor_to_damage(ctx.resolved_damage as f64 * (scale - 1.0));
            // Emitted even at scale 1.0 so the HUD can show the meter
            EffectOutcome::single(bonus, EffectEvent::ComboAccumulate { scale })
        }
    }
}

/// `min(1 + (streak / 50) * (max - 1), max)`
pub fn combo_accumulate_scale(streak: u32, max_scale: f64) -> f64 {
    let scale = 1.0 + (streak as f64 / COMBO_ACCUMULATE_FULL_STREAK) * (max_scale - 1.0);
    scale.min(max_scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog::{Catalog, Weapon};
    use crate::engine::rng::ScriptedRolls;
    use proptest::prelude::*;

    fn ctx(
        resolved_damage: u64,
        base_damage: u32,
        is_critical: bool,
        combo_streak: u32,
    ) -> EffectContext {
        EffectContext {
            resolved_damage,
            base_damage,
            is_critical,
            combo_streak,
        }
    }

    fn test_weapon(effect: WeaponEffect) -> Weapon {
        Weapon {
            id: "test".to_string(),
            display_name: "Test".to_string(),
            base_damage: 100,
            unlock_score: 0,
            effect,
        }
    }

    #[test]
    fn test_none_effect() {
        let catalog = Catalog::standard();
        let hand = catalog.find_weapon("hand").unwrap();
        let mut rolls = ScriptedRolls::new(&[0.0]);
        let outcome = apply_effect(hand, &ctx(10, 10, true, 40), &mut rolls);
        assert_eq!(outcome, EffectOutcome::default());
        assert_eq!(rolls.consumed(), 0);
    }

    #[test]
    fn test_hammer_area_proc() {
        let catalog = Catalog::standard();
        let hammer = catalog.find_weapon("hammer").unwrap();
        let mut rolls = ScriptedRolls::new(&[0.1]);
        let outcome = apply_effect(hammer, &ctx(50, 50, false, 1), &mut rolls);
        assert_eq!(outcome.bonus_damage, 75);
        assert_eq!(
            outcome.events,
            vec![EffectEvent::AreaDamage {
                radius: 200.0,
                scale: 1.5
            }]
        );
    }

    #[test]
    fn test_area_miss() {
        let catalog = Catalog::standard();
        let hammer = catalog.find_weapon("hammer").unwrap();
        let mut rolls = ScriptedRolls::new(&[0.15]);
        let outcome = apply_effect(hammer, &ctx(50, 50, false, 1), &mut rolls);
        assert_eq!(outcome, EffectOutcome::default());
        assert_eq!(rolls.consumed(), 1);
    }

    #[test]
    fn test_multi_hit_uses_base_damage() {
        let catalog = Catalog::standard();
        let keyboard = catalog.find_weapon("keyboard").unwrap();
        let mut rolls = ScriptedRolls::new(&[0.05]);
        // Resolved damage is irrelevant: 20 * 0.5 * 2
        let outcome = apply_effect(keyboard, &ctx(999, 20, true, 30), &mut rolls);
        assert_eq!(outcome.bonus_damage, 20);
        assert_eq!(outcome.events, vec![EffectEvent::MultiHit { count: 2, scale: 0.5 }]);
    }

    #[test]
    fn test_crit_boost_needs_crit() {
        let weapon = test_weapon(WeaponEffect::CritBoost {
            proc_chance: 0.5,
            damage_scale: 0.5,
        });

        let mut rolls = ScriptedRolls::new(&[0.0]);
        let outcome = apply_effect(&weapon, &ctx(200, 100, false, 0), &mut rolls);
        assert_eq!(outcome, EffectOutcome::default());
        assert_eq!(rolls.consumed(), 0, "no roll on a non-crit tap");

        let outcome = apply_effect(&weapon, &ctx(200, 100, true, 0), &mut rolls);
        assert_eq!(outcome.bonus_damage, 100);
        assert_eq!(outcome.events, vec![EffectEvent::CritBoost { scale: 0.5 }]);

        // Crit, but the proc misses
        let mut rolls = ScriptedRolls::new(&[0.7]);
        let outcome = apply_effect(&weapon, &ctx(200, 100, true, 0), &mut rolls);
        assert_eq!(outcome.bonus_damage, 0);
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_combo_accumulate() {
        let catalog = Catalog::standard();
        let rocket = catalog.find_weapon("rocket").unwrap();
        let mut rolls = ScriptedRolls::new(&[]);

        let outcome = apply_effect(rocket, &ctx(800, 400, false, 25), &mut rolls);
        assert_eq!(outcome.bonus_damage, 800);
        assert_eq!(outcome.events, vec![EffectEvent::ComboAccumulate { scale: 2.0 }]);
        assert_eq!(rolls.consumed(), 0);
    }

    #[test]
    fn test_combo_accumulate_caps_and_emits_at_zero() {
        assert_eq!(combo_accumulate_scale(200, 3.0), 3.0);
        assert_eq!(combo_accumulate_scale(0, 3.0), 1.0);

        let weapon = test_weapon(WeaponEffect::ComboAccumulate { max_scale: 3.0 });
        let mut rolls = ScriptedRolls::new(&[]);
        let outcome = apply_effect(&weapon, &ctx(100, 100, false, 0), &mut rolls);
        assert_eq!(outcome.bonus_damage, 0);
        assert_eq!(outcome.events, vec![EffectEvent::ComboAccumulate { scale: 1.0 }]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(EffectEvent::MultiHit { count: 2, scale: 0.5 }.label(), "2 hit combo!");
        assert_eq!(EffectEvent::ComboAccumulate { scale: 2.0 }.label(), "x2.00 combo bonus");
    }

    fn any_effect() -> impl Strategy<Value = WeaponEffect> {
        prop_oneof![
            Just(WeaponEffect::None),
            (0.0..=1.0f64, 0u32..8, 0.0..5.0f64).prop_map(|(p, n, s)| WeaponEffect::MultiHit {
                proc_chance: p,
                extra_hit_count: n,
                damage_scale: s,
            }),
            (0.0..=1.0f64, 0.0..500.0f32, 0.0..5.0f64).prop_map(|(p, r, s)| {
                WeaponEffect::AreaDamage {
                    proc_chance: p,
                    radius: r,
                    damage_scale: s,
                }
            }),
            (0.0..=1.0f64, 0.0..5.0f64).prop_map(|(p, s)| WeaponEffect::CritBoost {
                proc_chance: p,
                damage_scale: s,
            }),
            (1.0..6.0f64).prop_map(|m| WeaponEffect::ComboAccumulate { max_scale: m }),
        ]
    }

    proptest! {
        #[test]
        fn prop_bonus_never_negative_and_bounded(
            effect in any_effect(),
            resolved in 0u64..1_000_000,
            crit in any::<bool>(),
            streak in 0u32..500,
            roll in 0.0..1.0f64,
        ) {
            let weapon = test_weapon(effect);
            let mut rolls = ScriptedRolls::new(&[roll]);
            let outcome = apply_effect(&weapon, &ctx(resolved, 100, crit, streak), &mut rolls);
            // u64 can't go negative; check the events agree with the bonus instead
            prop_assert!(outcome.events.len() <= 1);
            if outcome.events.is_empty() {
                prop_assert_eq!(outcome.bonus_damage, 0);
            }
            prop_assert!(rolls.consumed() <= 1);
        }
    }
}
