//! Save/load of player progress
//!
//! Progress lives in a flat string key-value store (LocalStorage on web). Each
//! record is JSON under its own key. Older saves still load: scalar score keys
//! stand in for a missing stats record, and the old achievements array (one
//! object per achievement) is converted. Corrupt or missing records fall back
//! to fresh defaults.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::engine::{AchievementRecord, AchievementState, CumulativeStats};
use crate::error::StorageError;

pub const KEY_TOTAL_SCORE: &str = "totalScore";
pub const KEY_MAX_COMBO: &str = "maxCombo";
pub const KEY_CURRENT_WEAPON: &str = "currentWeapon";
pub const KEY_ACHIEVEMENTS: &str = "achievements";
pub const KEY_CUMULATIVE_STATS: &str = "cumulativeStats";
const TODAY_SCORE_PREFIX: &str = "todayScore_";

const DEFAULT_WEAPON: &str = "hand";
const MS_PER_DAY: Millis = 24 * 60 * 60 * 1000;

/// String key-value store
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Everything persisted between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub stats: CumulativeStats,
    pub achievements: AchievementState,
    pub current_weapon: String,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            stats: CumulativeStats::default(),
            achievements: AchievementState::default(),
            current_weapon: DEFAULT_WEAPON.to_string(),
        }
    }
}

/// Write all progress records
pub fn save_progress(storage: &mut impl Storage, save: &SaveData) -> Result<(), StorageError> {
    storage.set(KEY_TOTAL_SCORE, &save.stats.total_score.to_string())?;
    storage.set(KEY_MAX_COMBO, &save.stats.max_combo_ever_reached.to_string())?;
    storage.set(KEY_CURRENT_WEAPON, &save.current_weapon)?;
    storage.set(KEY_ACHIEVEMENTS, &serde_json::to_string(&save.achievements)?)?;
    storage.set(KEY_CUMULATIVE_STATS, &serde_json::to_string(&save.stats)?)?;
    log::info!(
        "Progress saved (score {}, {} achievements)",
        save.stats.total_score,
        save.achievements.unlocked_count()
    );
    Ok(())
}

/// Read progress back, filling gaps with defaults
pub fn load_progress(storage: &impl Storage) -> SaveData {
    let mut save = SaveData::default();

    match read_json::<CumulativeStats>(storage, KEY_CUMULATIVE_STATS) {
        Some(stats) => save.stats = stats,
        None => {
            // Saves from before the stats record only carry the scalars
            if let Some(total) = read_json::<u64>(storage, KEY_TOTAL_SCORE) {
                save.stats.total_score = total;
            }
            if let Some(combo) = read_json::<u32>(storage, KEY_MAX_COMBO) {
                save.stats.max_combo_ever_reached = combo;
            }
        }
    }

    if let Some(stored) = read_json::<StoredAchievements>(storage, KEY_ACHIEVEMENTS) {
        save.achievements = stored.into_state();
    }
    if let Some(weapon) = storage.get(KEY_CURRENT_WEAPON).filter(|w| !w.is_empty()) {
        save.current_weapon = weapon;
    }

    log::info!(
        "Loaded progress: score {}, weapon '{}'",
        save.stats.total_score,
        save.current_weapon
    );
    save
}

/// Remove all progress records (daily counters are left alone)
pub fn clear_progress(storage: &mut impl Storage) -> Result<(), StorageError> {
    for key in [
        KEY_TOTAL_SCORE,
        KEY_MAX_COMBO,
        KEY_CURRENT_WEAPON,
        KEY_ACHIEVEMENTS,
        KEY_CUMULATIVE_STATS,
    ] {
        storage.remove(key)?;
    }
    log::info!("Progress cleared");
    Ok(())
}

/// Storage key of the daily score counter for the UTC day containing `now`
pub fn today_key(now: Millis) -> String {
    format!("{}{}", TODAY_SCORE_PREFIX, now / MS_PER_DAY)
}

pub fn today_score(storage: &impl Storage, now: Millis) -> u64 {
    read_json::<u64>(storage, &today_key(now)).unwrap_or(0)
}

/// Add to today's counter and return the new value
pub fn add_today_score(
    storage: &mut impl Storage,
    now: Millis,
    delta: u64,
) -> Result<u64, StorageError> {
    let total = today_score(storage, now).saturating_add(delta);
    storage.set(&today_key(now), &total.to_string())?;
    Ok(total)
}

/// Either the current map layout or the older array of achievement objects
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredAchievements {
    Current(AchievementState),
    Legacy(Vec<LegacyAchievement>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyAchievement {
    id: String,
    #[serde(default)]
    unlocked: bool,
    #[serde(default)]
    unlocked_time: Option<f64>,
}

impl StoredAchievements {
    fn into_state(self) -> AchievementState {
        match self {
            StoredAchievements::Current(state) => state,
            StoredAchievements::Legacy(entries) => {
                log::info!("Converting {} legacy achievement entries", entries.len());
                entries
                    .into_iter()
                    .filter(|entry| entry.unlocked)
                    .map(|entry| {
                        let unlocked_at = entry
                            .unlocked_time
                            .filter(|t| t.is_finite() && *t >= 0.0)
                            .map(|t| t as Millis);
                        let record = AchievementRecord {
                            unlocked: true,
                            unlocked_at,
                        };
                        (entry.id, record)
                    })
                    .collect()
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring corrupt '{}' record: {}", key, e);
            None
        }
    }
}
