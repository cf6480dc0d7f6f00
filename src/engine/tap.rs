//! Composed tap handling
//!
//! `TapEngine::on_tap` chains the whole pipeline for one tap: streak update,
//! crit roll, damage, weapon effect, score, unlocks. Randomness is drawn in a
//! fixed order (crit first, then the weapon effect) so a seeded source
//! replays a session exactly.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::combo::ComboTracker;
use super::damage::{resolve_damage, roll_critical};
use super::effects::{EffectContext, EffectEvent, apply_effect};
use super::progress::{
    AchievementProgress, AchievementState, CumulativeStats, ProgressTracker, UnlockEvent,
    UnlockKind, UnlockStatus,
};
use super::rng::{RandomSource, SeededRng};
use crate::error::CatalogError;
use crate::sync::{SyncBatch, SyncQueue};
use crate::tuning::Tuning;
use crate::Millis;

/// One tap from the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapInput {
    pub now: Millis,
    pub weapon_id: String,
    pub rage_active: bool,
}

impl TapInput {
    pub fn new(now: Millis, weapon_id: impl Into<String>, rage_active: bool) -> Self {
        Self {
            now,
            weapon_id: weapon_id.into(),
            rage_active,
        }
    }
}

/// Everything the presentation layer needs to render one tap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapOutcome {
    /// Total applied to score (resolved + bonus)
    pub damage: u64,
    pub resolved_damage: u64,
    pub bonus_damage: u64,
    pub is_critical: bool,
    pub combo_streak: u32,
    pub effect_events: Vec<EffectEvent>,
    pub unlock_events: Vec<UnlockEvent>,
}

/// Progression engine for one player session
pub struct TapEngine<R: RandomSource = SeededRng> {
    catalog: Arc<Catalog>,
    tuning: Tuning,
    combo: ComboTracker,
    progress: ProgressTracker,
    rng: R,
    outbox: SyncQueue,
}

impl<R: RandomSource> TapEngine<R> {
    pub fn new(catalog: Arc<Catalog>, tuning: Tuning, rng: R) -> Self {
        let combo = ComboTracker::new(tuning.idle_window_ms, tuning.combo_brackets.clone());
        let progress = ProgressTracker::new(Arc::clone(&catalog));
        Self {
            catalog,
            tuning,
            combo,
            progress,
            rng,
            outbox: SyncQueue::new(),
        }
    }

    /// Resolve one tap end to end
    pub fn on_tap(&mut self, input: &TapInput) -> Result<TapOutcome, CatalogError> {
        // Validate the weapon first so a rejected tap leaves the session untouched
        let catalog = Arc::clone(&self.catalog);
        let weapon = catalog.find_wieldable(&input.weapon_id)?;
        if !self.can_wield(&input.weapon_id)? {
            return Err(CatalogError::WeaponLocked(input.weapon_id.clone()));
        }

        let combo_streak = self.combo.register_tap(input.now);
        let multiplier = self.combo.current_multiplier();
        let is_critical = roll_critical(&mut self.rng, self.tuning.crit_chance);

        let resolved_damage = resolve_damage(weapon, is_critical, multiplier, input.rage_active);
        let effect = apply_effect(
            weapon,
            &EffectContext {
                resolved_damage,
                base_damage: weapon.base_damage(),
                is_critical,
                combo_streak,
            },
            &mut self.rng,
        );
        let damage = resolved_damage.saturating_add(effect.bonus_damage);

        self.progress.record_tap(damage);
        self.progress.record_score(damage);
        self.progress.record_combo(combo_streak);
        let unlock_events = self.evaluate_unlocks(input.now);
        self.outbox.push_score(self.progress.stats().total_score);

        log::debug!(
            "Tap with {}: {} dmg ({} + {} bonus), crit={}, streak={}",
            input.weapon_id,
            damage,
            resolved_damage,
            effect.bonus_damage,
            is_critical,
            combo_streak
        );

        Ok(TapOutcome {
            damage,
            resolved_damage,
            bonus_damage: effect.bonus_damage,
            is_critical,
            combo_streak,
            effect_events: effect.events,
            unlock_events,
        })
    }

    /// Idle timer hook: drop the streak once the window lapses
    pub fn check_idle_reset(&mut self, now: Millis) -> bool {
        self.combo.check_idle_reset(now)
    }

    /// Player shared the game
    pub fn record_share(&mut self, now: Millis) -> Vec<UnlockEvent> {
        self.progress.record_share();
        self.evaluate_unlocks(now)
    }

    fn evaluate_unlocks(&mut self, now: Millis) -> Vec<UnlockEvent> {
        let events = self.progress.evaluate_unlocks(now);
        for event in events.iter().filter(|e| e.kind == UnlockKind::Achievement) {
            self.outbox.push_achievement(event.id.as_str());
        }
        events
    }

    /// Whether the player may switch to this weapon
    pub fn can_wield(&self, weapon_id: &str) -> Result<bool, CatalogError> {
        Ok(self.progress.weapon_status(weapon_id)? == UnlockStatus::Unlocked)
    }

    pub fn cumulative_stats(&self) -> &CumulativeStats {
        self.progress.stats()
    }

    pub fn achievement_state(&self) -> &AchievementState {
        self.progress.achievement_state()
    }

    pub fn achievement_status(&self, id: &str) -> Result<UnlockStatus, CatalogError> {
        self.progress.achievement_status(id)
    }

    pub fn achievement_progress(&self) -> AchievementProgress {
        self.progress.achievement_progress()
    }

    pub fn combo_streak(&self) -> u32 {
        self.combo.streak()
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn load_cumulative_stats(&mut self, snapshot: CumulativeStats) -> Result<(), CatalogError> {
        self.progress.load_stats(snapshot)
    }

    pub fn load_achievement_state(
        &mut self,
        snapshot: AchievementState,
    ) -> Result<(), CatalogError> {
        self.progress.load_achievement_state(snapshot)
    }

    /// Wipe all progress (the "reset score" action)
    pub fn reset_progress(&mut self) {
        self.progress.reset();
        self.combo.clear();
        self.outbox.clear();
        self.outbox.push_score(0);
    }

    /// Pending backend updates, oldest first
    pub fn drain_sync_notices(&mut self) -> SyncBatch {
        self.outbox.drain()
    }

    /// Hand back a batch the backend rejected so it goes out again
    pub fn requeue_sync_notices(&mut self, failed: SyncBatch) {
        self.outbox.requeue(failed);
    }
}

/// Paces unlock announcements one at a time so animations never overlap
#[derive(Debug, Clone, Default)]
pub struct UnlockQueue {
    pending: VecDeque<UnlockEvent>,
}

impl UnlockQueue {
    pub fn push_all(&mut self, events: impl IntoIterator<Item = UnlockEvent>) {
        self.pending.extend(events);
    }

    /// Next announcement to show, if any
    pub fn next_event(&mut self) -> Option<UnlockEvent> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
