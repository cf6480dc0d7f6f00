//! Cumulative stats and unlock evaluation
//!
//! The tracker is the only writer of `CumulativeStats` and `AchievementState`.
//! Every catalog entry moves one way, Locked -> Unlocked, and produces exactly
//! one `UnlockEvent` when it does. Only `reset` puts entries back to Locked.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::{Achievement, Catalog, ConditionKind, SpecialUnlock, SpecialWeapon};
use crate::error::CatalogError;
use crate::Millis;

/// Lifetime player stats; every field only grows outside of a reset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CumulativeStats {
    pub total_score: u64,
    pub max_combo_ever_reached: u32,
    pub tap_count: u64,
    pub max_single_hit_damage: u64,
    /// Regular and special weapons, kept sorted for stable snapshots
    pub unlocked_weapon_ids: BTreeSet<String>,
    pub share_count: u32,
}

/// Runtime unlock record for one achievement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub unlocked: bool,
    pub unlocked_at: Option<Millis>,
}

/// Per-player achievement unlock records, keyed by achievement id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementState {
    records: BTreeMap<String, AchievementRecord>,
}

impl AchievementState {
    /// Record for an achievement (an absent id reads as locked)
    pub fn record(&self, id: &str) -> AchievementRecord {
        self.records.get(id).copied().unwrap_or_default()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.record(id).unlocked
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AchievementRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn unlocked_count(&self) -> usize {
        self.records.values().filter(|r| r.unlocked).count()
    }

    fn mark_unlocked(&mut self, id: &str, now: Millis) {
        self.records.insert(
            id.to_string(),
            AchievementRecord {
                unlocked: true,
                unlocked_at: Some(now),
            },
        );
    }
}

impl FromIterator<(String, AchievementRecord)> for AchievementState {
    fn from_iter<I: IntoIterator<Item = (String, AchievementRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockStatus {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockKind {
    Weapon,
    SpecialWeapon,
    Achievement,
}

/// A catalog entry that just became available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockEvent {
    pub kind: UnlockKind,
    pub id: String,
    pub display_name: String,
    /// Informational reward shown with achievements (0 for weapons)
    pub reward_score: u64,
    pub unlocked_at: Millis,
}

/// Achievement completion summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub total: usize,
    pub unlocked: usize,
    /// Rounded to the nearest whole percent
    pub percentage: u32,
}

/// Owns cumulative stats and unlock state for one player
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    catalog: Arc<Catalog>,
    stats: CumulativeStats,
    achievements: AchievementState,
}

impl ProgressTracker {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let mut tracker = Self {
            catalog,
            stats: CumulativeStats::default(),
            achievements: AchievementState::default(),
        };
        tracker.grant_starting_weapons();
        tracker
    }

    /// Starting weapons are owned silently, without an unlock event
    fn grant_starting_weapons(&mut self) {
        for weapon in self.catalog.starting_weapons() {
            self.stats.unlocked_weapon_ids.insert(weapon.id.clone());
        }
    }

    /// A loaded score already paid for every weapon at or below it. Saves that
    /// only carry the score get those back without replaying the unlocks.
    fn grant_earned_weapons(&mut self) {
        let total_score = self.stats.total_score;
        for weapon in self.catalog.list_weapons() {
            if weapon.unlock_score <= total_score {
                self.stats.unlocked_weapon_ids.insert(weapon.id.clone());
            }
        }
    }

    /// Regular weapons owned; special weapons don't count toward collections
    fn regular_weapons_unlocked(&self) -> u64 {
        self.catalog
            .list_weapons()
            .iter()
            .filter(|w| self.stats.unlocked_weapon_ids.contains(&w.id))
            .count() as u64
    }

    pub fn record_tap(&mut self, damage_dealt: u64) {
        self.stats.tap_count = self.stats.tap_count.saturating_add(1);
        self.stats.max_single_hit_damage = self.stats.max_single_hit_damage.max(damage_dealt);
    }

    pub fn record_score(&mut self, delta: u64) {
        self.stats.total_score = self.stats.total_score.saturating_add(delta);
    }

    pub fn record_combo(&mut self, streak: u32) {
        self.stats.max_combo_ever_reached = self.stats.max_combo_ever_reached.max(streak);
    }

    pub fn record_share(&mut self) {
        self.stats.share_count = self.stats.share_count.saturating_add(1);
    }

    /// Unlock everything whose condition the current stats satisfy.
    ///
    /// Events come back in catalog order: weapons, then special weapons, then
    /// achievements. Weapons unlocked here count toward weapon-collection
    /// achievements in the same call.
    pub fn evaluate_unlocks(&mut self, now: Millis) -> Vec<UnlockEvent> {
        let catalog = Arc::clone(&self.catalog);
        let mut events = Vec::new();

        for weapon in catalog.list_weapons() {
            if self.stats.unlocked_weapon_ids.contains(&weapon.id)
                || weapon.unlock_score > self.stats.total_score
            {
                continue;
            }
            self.stats.unlocked_weapon_ids.insert(weapon.id.clone());
            events.push(UnlockEvent {
                kind: UnlockKind::Weapon,
                id: weapon.id.clone(),
                display_name: weapon.display_name.clone(),
                reward_score: 0,
                unlocked_at: now,
            });
        }

        for weapon in catalog.list_special_weapons() {
            if self.stats.unlocked_weapon_ids.contains(&weapon.id)
                || !self.special_condition_met(weapon)
            {
                continue;
            }
            self.stats.unlocked_weapon_ids.insert(weapon.id.clone());
            events.push(UnlockEvent {
                kind: UnlockKind::SpecialWeapon,
                id: weapon.id.clone(),
                display_name: weapon.display_name.clone(),
                reward_score: 0,
                unlocked_at: now,
            });
        }

        for achievement in catalog.list_achievements() {
            if self.achievements.is_unlocked(&achievement.id)
                || !self.achievement_condition_met(achievement)
            {
                continue;
            }
            self.achievements.mark_unlocked(&achievement.id, now);
            events.push(UnlockEvent {
                kind: UnlockKind::Achievement,
                id: achievement.id.clone(),
                display_name: achievement.display_name.clone(),
                reward_score: achievement.reward_score,
                unlocked_at: now,
            });
        }

        for event in &events {
            log::info!("Unlocked {:?} '{}'", event.kind, event.id);
        }
        events
    }

    fn special_condition_met(&self, weapon: &SpecialWeapon) -> bool {
        let current = match weapon.unlock_type {
            SpecialUnlock::ScoreAchievement => self.stats.total_score,
            SpecialUnlock::ComboAchievement => self.stats.max_combo_ever_reached as u64,
            SpecialUnlock::ShareCount => self.stats.share_count as u64,
        };
        current >= weapon.unlock_threshold
    }

    fn achievement_condition_met(&self, achievement: &Achievement) -> bool {
        let current = match achievement.condition_kind {
            ConditionKind::TapCount => self.stats.tap_count,
            ConditionKind::SingleHitDamage => self.stats.max_single_hit_damage,
            ConditionKind::DistinctWeaponsUnlocked => self.regular_weapons_unlocked(),
            ConditionKind::ComboCount => self.stats.max_combo_ever_reached as u64,
            ConditionKind::TotalScore => self.stats.total_score,
        };
        current >= achievement.threshold
    }

    /// Lock state of a regular or special weapon
    pub fn weapon_status(&self, id: &str) -> Result<UnlockStatus, CatalogError> {
        self.catalog.find_wieldable(id)?;
        Ok(if self.stats.unlocked_weapon_ids.contains(id) {
            UnlockStatus::Unlocked
        } else {
            UnlockStatus::Locked
        })
    }

    pub fn achievement_status(&self, id: &str) -> Result<UnlockStatus, CatalogError> {
        self.catalog.find_achievement(id)?;
        Ok(if self.achievements.is_unlocked(id) {
            UnlockStatus::Unlocked
        } else {
            UnlockStatus::Locked
        })
    }

    pub fn achievement_progress(&self) -> AchievementProgress {
        let total = self.catalog.list_achievements().len();
        let unlocked = self
            .catalog
            .list_achievements()
            .iter()
            .filter(|a| self.achievements.is_unlocked(&a.id))
            .count();
        let percentage = if total == 0 {
            0
        } else {
            (unlocked as f64 / total as f64 * 100.0).round() as u32
        };
        AchievementProgress {
            total,
            unlocked,
            percentage,
        }
    }

    pub fn stats(&self) -> &CumulativeStats {
        &self.stats
    }

    pub fn achievement_state(&self) -> &AchievementState {
        &self.achievements
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Replace stats with a stored snapshot. Fails on weapon ids the catalog
    /// doesn't know, leaving the current stats untouched.
    pub fn load_stats(&mut self, snapshot: CumulativeStats) -> Result<(), CatalogError> {
        for id in &snapshot.unlocked_weapon_ids {
            self.catalog.find_wieldable(id)?;
        }
        self.stats = snapshot;
        self.grant_earned_weapons();
        log::info!(
            "Loaded stats: score {}, {} taps, {} weapons",
            self.stats.total_score,
            self.stats.tap_count,
            self.stats.unlocked_weapon_ids.len()
        );
        Ok(())
    }

    /// Replace achievement state with a stored snapshot. Fails on ids the
    /// catalog doesn't know, leaving the current state untouched.
    pub fn load_achievement_state(
        &mut self,
        snapshot: AchievementState,
    ) -> Result<(), CatalogError> {
        for (id, _) in snapshot.iter() {
            self.catalog.find_achievement(id)?;
        }
        self.achievements = snapshot;
        log::info!(
            "Loaded achievements: {} unlocked",
            self.achievements.unlocked_count()
        );
        Ok(())
    }

    /// Back to a brand new player
    pub fn reset(&mut self) {
        self.stats = CumulativeStats::default();
        self.achievements = AchievementState::default();
        self.grant_starting_weapons();
        log::warn!("Progress reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(Arc::new(Catalog::standard()))
    }

    fn ids(events: &[UnlockEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_starting_weapon_owned_without_event() {
        let mut progress = tracker();
        assert_eq!(progress.weapon_status("hand").unwrap(), UnlockStatus::Unlocked);
        assert_eq!(progress.weapon_status("keyboard").unwrap(), UnlockStatus::Locked);
        assert!(progress.evaluate_unlocks(0).is_empty());
    }

    #[test]
    fn test_record_tap_tracks_max() {
        let mut progress = tracker();
        progress.record_tap(40);
        progress.record_tap(12);
        assert_eq!(progress.stats().tap_count, 2);
        assert_eq!(progress.stats().max_single_hit_damage, 40);
    }

    #[test]
    fn test_record_combo_keeps_high_water_mark() {
        let mut progress = tracker();
        progress.record_combo(12);
        progress.record_combo(3);
        assert_eq!(progress.stats().max_combo_ever_reached, 12);
    }

    #[test]
    fn test_score_threshold_unlocks_once() {
        let mut progress = tracker();
        progress.record_score(4999);
        let first = progress.evaluate_unlocks(1_000);
        assert!(!ids(&first).contains(&"wealthy"));
        assert_eq!(
            progress.achievement_status("wealthy").unwrap(),
            UnlockStatus::Locked
        );

        progress.record_score(2);
        assert_eq!(progress.stats().total_score, 5001);
        let second = progress.evaluate_unlocks(2_000);
        assert_eq!(ids(&second).iter().filter(|id| **id == "wealthy").count(), 1);
        let wealthy = second.iter().find(|e| e.id == "wealthy").unwrap();
        assert_eq!(wealthy.kind, UnlockKind::Achievement);
        assert_eq!(wealthy.reward_score, 1000);
        assert_eq!(
            progress.achievement_state().record("wealthy"),
            AchievementRecord {
                unlocked: true,
                unlocked_at: Some(2_000)
            }
        );

        assert!(progress.evaluate_unlocks(3_000).is_empty());
    }

    #[test]
    fn test_catalog_order_and_same_call_collection() {
        let mut progress = tracker();
        progress.record_score(500);
        let events = progress.evaluate_unlocks(0);
        // keyboard + hammer join hand, which satisfies the 3-weapon collector
        assert_eq!(ids(&events), ["keyboard", "hammer", "collector"]);
        assert_eq!(events[0].kind, UnlockKind::Weapon);
        assert_eq!(events[2].kind, UnlockKind::Achievement);
    }

    #[test]
    fn test_special_weapon_conditions() {
        let mut progress = tracker();
        progress.record_share();
        progress.record_share();
        assert!(progress.evaluate_unlocks(0).is_empty());

        progress.record_share();
        let events = progress.evaluate_unlocks(0);
        assert_eq!(ids(&events), ["megaphone"]);
        assert_eq!(events[0].kind, UnlockKind::SpecialWeapon);

        progress.record_combo(50);
        let events = progress.evaluate_unlocks(0);
        // Special weapons don't count toward the collector; beast (combo 10) does fire
        assert_eq!(ids(&events), ["combo_gauntlet", "beast"]);
        assert_eq!(progress.achievement_status("collector").unwrap(), UnlockStatus::Locked);
    }

    #[test]
    fn test_collections_count_regular_weapons_only() {
        let mut progress = tracker();
        progress.record_score(2_500);
        progress.record_combo(50);
        for _ in 0..3 {
            progress.record_share();
        }
        let events = progress.evaluate_unlocks(0);
        assert!(ids(&events).contains(&"collector"));
        // 5 regular + 2 special is seven weapons, still short of legend's 6 regular
        assert_eq!(progress.stats().unlocked_weapon_ids.len(), 7);
        assert!(!ids(&events).contains(&"legend"));

        progress.record_score(2_500);
        let events = progress.evaluate_unlocks(1);
        assert_eq!(ids(&events), ["rocket", "wealthy", "legend"]);
    }

    #[test]
    fn test_load_grants_score_gated_weapons_silently() {
        let mut progress = tracker();
        let mut stats = CumulativeStats::default();
        stats.total_score = 1_200;
        progress.load_stats(stats).unwrap();

        for id in ["hand", "keyboard", "hammer", "baseball"] {
            assert_eq!(progress.weapon_status(id).unwrap(), UnlockStatus::Unlocked);
        }
        assert_eq!(progress.weapon_status("lightning").unwrap(), UnlockStatus::Locked);
        let events = progress.evaluate_unlocks(0);
        assert!(events.iter().all(|e| e.kind == UnlockKind::Achievement));
    }

    #[test]
    fn test_tap_and_damage_achievements() {
        let mut progress = tracker();
        for _ in 0..99 {
            progress.record_tap(10);
        }
        assert!(progress.evaluate_unlocks(0).is_empty());
        progress.record_tap(1_000);
        assert_eq!(ids(&progress.evaluate_unlocks(0)), ["puncher", "destroyer"]);
    }

    #[test]
    fn test_reset_relocks_everything() {
        let mut progress = tracker();
        progress.record_score(20_000);
        progress.record_combo(60);
        assert!(!progress.evaluate_unlocks(0).is_empty());

        progress.reset();
        assert!(progress.evaluate_unlocks(0).is_empty());
        for achievement in Catalog::standard().list_achievements() {
            assert_eq!(
                progress.achievement_status(&achievement.id).unwrap(),
                UnlockStatus::Locked
            );
        }
        assert_eq!(progress.stats().total_score, 0);
        assert_eq!(progress.weapon_status("hand").unwrap(), UnlockStatus::Unlocked);
        assert_eq!(progress.achievement_progress().unlocked, 0);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let progress = tracker();
        assert!(matches!(
            progress.weapon_status("laser"),
            Err(CatalogError::UnknownWeapon(_))
        ));
        assert!(matches!(
            progress.achievement_status("speedrunner"),
            Err(CatalogError::UnknownAchievement(_))
        ));
    }

    #[test]
    fn test_progress_percentage() {
        let mut progress = tracker();
        progress.record_combo(10);
        progress.evaluate_unlocks(0);
        let summary = progress.achievement_progress();
        assert_eq!(summary.total, 6);
        assert_eq!(summary.unlocked, 1);
        assert_eq!(summary.percentage, 17);
    }

    #[test]
    fn test_load_snapshots() {
        let mut source = tracker();
        source.record_score(1_200);
        source.record_tap(90);
        source.evaluate_unlocks(5);

        let mut restored = tracker();
        restored.load_stats(source.stats().clone()).unwrap();
        restored
            .load_achievement_state(source.achievement_state().clone())
            .unwrap();
        assert_eq!(restored.stats(), source.stats());
        assert_eq!(
            restored.achievement_status("collector").unwrap(),
            UnlockStatus::Unlocked
        );
        // Nothing new to announce after hydration
        assert!(restored.evaluate_unlocks(10).is_empty());
    }

    #[test]
    fn test_load_rejects_unknown_ids() {
        let mut progress = tracker();
        let mut stats = CumulativeStats::default();
        stats.unlocked_weapon_ids.insert("bazooka".to_string());
        stats.total_score = 99;
        assert!(progress.load_stats(stats).is_err());
        assert_eq!(progress.stats().total_score, 0);

        let state: AchievementState =
            serde_json::from_str(r#"{ "ghost": { "unlocked": true, "unlocked_at": 1 } }"#).unwrap();
        assert!(matches!(
            progress.load_achievement_state(state),
            Err(CatalogError::UnknownAchievement(_))
        ));
    }

    #[test]
    fn test_load_stats_regrants_starting_weapon() {
        let mut progress = tracker();
        progress.load_stats(CumulativeStats::default()).unwrap();
        assert_eq!(progress.weapon_status("hand").unwrap(), UnlockStatus::Unlocked);
    }
}
