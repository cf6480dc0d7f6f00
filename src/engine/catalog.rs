//! Static weapon and achievement definitions
//!
//! The catalog is immutable once built. Runtime unlock state is tracked
//! separately by the progress tracker so one catalog can back any number of
//! sessions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Special mechanic attached to a weapon
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeaponEffect {
    #[default]
    None,
    /// Chance to land extra hits, each scaled off base damage
    MultiHit {
        proc_chance: f64,
        extra_hit_count: u32,
        damage_scale: f64,
    },
    /// Chance to splash damage around the target (radius is cosmetic)
    AreaDamage {
        proc_chance: f64,
        radius: f32,
        damage_scale: f64,
    },
    /// Chance to amplify a critical hit
    CritBoost { proc_chance: f64, damage_scale: f64 },
    /// Bonus that grows with the current streak, capped at `max_scale`
    ComboAccumulate { max_scale: f64 },
}

impl WeaponEffect {
    fn validate(&self, id: &str) -> Result<(), CatalogError> {
        let invalid = |reason| Err(CatalogError::InvalidEffect(id.to_string(), reason));
        let proc_ok = |p: f64| (0.0..=1.0).contains(&p);
        let scale_ok = |s: f64| s.is_finite() && s >= 0.0;

        match *self {
            WeaponEffect::None => Ok(()),
            WeaponEffect::MultiHit {
                proc_chance,
                damage_scale,
                ..
            }
            | WeaponEffect::AreaDamage {
                proc_chance,
                damage_scale,
                ..
            }
            | WeaponEffect::CritBoost {
                proc_chance,
                damage_scale,
            } => {
                if !proc_ok(proc_chance) {
                    invalid("proc_chance must be within [0, 1]")
                } else if !scale_ok(damage_scale) {
                    invalid("damage_scale must be finite and non-negative")
                } else {
                    Ok(())
                }
            }
            WeaponEffect::ComboAccumulate { max_scale } => {
                if max_scale.is_finite() && max_scale >= 1.0 {
                    Ok(())
                } else {
                    invalid("max_scale must be at least 1")
                }
            }
        }
    }
}

/// A weapon unlocked by cumulative score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub display_name: String,
    pub base_damage: u32,
    /// Cumulative score needed; 0 marks a starting weapon
    pub unlock_score: u64,
    #[serde(default)]
    pub effect: WeaponEffect,
}

/// What gates a special weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialUnlock {
    /// Reach a cumulative score
    ScoreAchievement,
    /// Reach a combo streak at least once
    ComboAchievement,
    /// Share the game a number of times
    ShareCount,
}

/// A weapon gated by something other than plain score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialWeapon {
    pub id: String,
    pub display_name: String,
    pub base_damage: u32,
    pub unlock_type: SpecialUnlock,
    pub unlock_threshold: u64,
    #[serde(default)]
    pub effect: WeaponEffect,
}

/// Anything that can be swung at the bag
pub trait Wieldable {
    fn id(&self) -> &str;
    fn base_damage(&self) -> u32;
    fn effect(&self) -> &WeaponEffect;
}

impl Wieldable for Weapon {
    fn id(&self) -> &str {
        &self.id
    }
    fn base_damage(&self) -> u32 {
        self.base_damage
    }
    fn effect(&self) -> &WeaponEffect {
        &self.effect
    }
}

impl Wieldable for SpecialWeapon {
    fn id(&self) -> &str {
        &self.id
    }
    fn base_damage(&self) -> u32 {
        self.base_damage
    }
    fn effect(&self) -> &WeaponEffect {
        &self.effect
    }
}

/// Stat an achievement is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    TapCount,
    SingleHitDamage,
    DistinctWeaponsUnlocked,
    ComboCount,
    TotalScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub display_name: String,
    pub condition_kind: ConditionKind,
    pub threshold: u64,
    /// Shown on the unlock card; never credited to score
    #[serde(default)]
    pub reward_score: u64,
}

/// Immutable content tables
#[derive(Debug, Clone)]
pub struct Catalog {
    weapons: Vec<Weapon>,
    special_weapons: Vec<SpecialWeapon>,
    achievements: Vec<Achievement>,
}

#[derive(Deserialize)]
struct CatalogFile {
    weapons: Vec<Weapon>,
    #[serde(default)]
    special_weapons: Vec<SpecialWeapon>,
    #[serde(default)]
    achievements: Vec<Achievement>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and broken definitions
    pub fn new(
        weapons: Vec<Weapon>,
        special_weapons: Vec<SpecialWeapon>,
        achievements: Vec<Achievement>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();

        // Weapons and special weapons share one id space (both land in the unlocked set)
        let weapon_defs = weapons
            .iter()
            .map(|w| (&w.id, w.base_damage, &w.effect))
            .chain(
                special_weapons
                    .iter()
                    .map(|w| (&w.id, w.base_damage, &w.effect)),
            );
        for (id, base_damage, effect) in weapon_defs {
            if !seen.insert(id.as_str()) {
                return Err(CatalogError::DuplicateId(id.clone()));
            }
            if base_damage == 0 {
                return Err(CatalogError::InvalidWeapon(
                    id.clone(),
                    "base_damage must be positive",
                ));
            }
            effect.validate(id)?;
        }

        let mut seen_achievements = HashSet::new();
        for achievement in &achievements {
            if !seen_achievements.insert(achievement.id.as_str()) {
                return Err(CatalogError::DuplicateId(achievement.id.clone()));
            }
        }

        Ok(Self {
            weapons,
            special_weapons,
            achievements,
        })
    }

    /// Load catalog content from JSON
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let catalog = Self::new(file.weapons, file.special_weapons, file.achievements)?;
        log::info!(
            "Loaded catalog: {} weapons, {} special weapons, {} achievements",
            catalog.weapons.len(),
            catalog.special_weapons.len(),
            catalog.achievements.len()
        );
        Ok(catalog)
    }

    /// The shipped game content
    pub fn standard() -> Self {
        Self {
            weapons: standard_weapons(),
            special_weapons: standard_special_weapons(),
            achievements: standard_achievements(),
        }
    }

    pub fn list_weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn list_special_weapons(&self) -> &[SpecialWeapon] {
        &self.special_weapons
    }

    pub fn list_achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn find_weapon(&self, id: &str) -> Result<&Weapon, CatalogError> {
        self.weapons
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| CatalogError::UnknownWeapon(id.to_string()))
    }

    pub fn find_special_weapon(&self, id: &str) -> Result<&SpecialWeapon, CatalogError> {
        self.special_weapons
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| CatalogError::UnknownWeapon(id.to_string()))
    }

    /// Look up any weapon by id, regular weapons first
    pub fn find_wieldable(&self, id: &str) -> Result<&dyn Wieldable, CatalogError> {
        if let Some(weapon) = self.weapons.iter().find(|w| w.id == id) {
            return Ok(weapon as &dyn Wieldable);
        }
        self.find_special_weapon(id).map(|w| w as &dyn Wieldable)
    }

    pub fn find_achievement(&self, id: &str) -> Result<&Achievement, CatalogError> {
        self.achievements
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| CatalogError::UnknownAchievement(id.to_string()))
    }

    /// Weapons every player owns from the first tap
    pub fn starting_weapons(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons.iter().filter(|w| w.unlock_score == 0)
    }
}

fn weapon(
    id: &str,
    name: &str,
    base_damage: u32,
    unlock_score: u64,
    effect: WeaponEffect,
) -> Weapon {
    Weapon {
        id: id.to_string(),
        display_name: name.to_string(),
        base_damage,
        unlock_score,
        effect,
    }
}

fn standard_weapons() -> Vec<Weapon> {
    vec![
        weapon("hand", "Bare Hand", 10, 0, WeaponEffect::None),
        weapon(
            "keyboard",
            "Keyboard",
            20,
            100,
            WeaponEffect::MultiHit {
                proc_chance: 0.2,
                extra_hit_count: 2,
                damage_scale: 0.5,
            },
        ),
        weapon(
            "hammer",
            "Hammer",
            50,
            500,
            WeaponEffect::AreaDamage {
                proc_chance: 0.15,
                radius: 200.0,
                damage_scale: 1.5,
            },
        ),
        weapon("baseball", "Baseball Bat", 100, 1000, WeaponEffect::None),
        weapon(
            "lightning",
            "Lightning",
            200,
            2500,
            WeaponEffect::CritBoost {
                proc_chance: 1.0,
                damage_scale: 0.5,
            },
        ),
        weapon(
            "rocket",
            "Rocket",
            400,
            5000,
            WeaponEffect::ComboAccumulate { max_scale: 3.0 },
        ),
    ]
}

fn standard_special_weapons() -> Vec<SpecialWeapon> {
    vec![
        SpecialWeapon {
            id: "golden_slipper".to_string(),
            display_name: "Golden Slipper".to_string(),
            base_damage: 300,
            unlock_type: SpecialUnlock::ScoreAchievement,
            unlock_threshold: 10_000,
            effect: WeaponEffect::MultiHit {
                proc_chance: 0.25,
                extra_hit_count: 3,
                damage_scale: 0.5,
            },
        },
        SpecialWeapon {
            id: "combo_gauntlet".to_string(),
            display_name: "Combo Gauntlet".to_string(),
            base_damage: 150,
            unlock_type: SpecialUnlock::ComboAchievement,
            unlock_threshold: 50,
            effect: WeaponEffect::ComboAccumulate { max_scale: 4.0 },
        },
        SpecialWeapon {
            id: "megaphone".to_string(),
            display_name: "Megaphone".to_string(),
            base_damage: 120,
            unlock_type: SpecialUnlock::ShareCount,
            unlock_threshold: 3,
            effect: WeaponEffect::AreaDamage {
                proc_chance: 0.3,
                radius: 260.0,
                damage_scale: 1.0,
            },
        },
    ]
}

fn standard_achievements() -> Vec<Achievement> {
    let achievement = |id: &str, name: &str, condition_kind, threshold, reward_score| Achievement {
        id: id.to_string(),
        display_name: name.to_string(),
        condition_kind,
        threshold,
        reward_score,
    };

    vec![
        achievement("puncher", "Puncher", ConditionKind::TapCount, 100, 100),
        achievement("destroyer", "Destroyer", ConditionKind::SingleHitDamage, 1000, 500),
        achievement(
            "collector",
            "Collector",
            ConditionKind::DistinctWeaponsUnlocked,
            3,
            200,
        ),
        achievement("beast", "Combo Beast", ConditionKind::ComboCount, 10, 300),
        achievement("wealthy", "Wealthy", ConditionKind::TotalScore, 5000, 1000),
        achievement(
            "legend",
            "Legend",
            ConditionKind::DistinctWeaponsUnlocked,
            6,
            2000,
        ),
    ]
}
