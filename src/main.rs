//! Tap Vent entry point
//!
//! Natively this plays a scripted session through the engine and prints a
//! summary. On the web the page drives the engine; the start hook only sets
//! up logging and loads saved progress.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    use tap_vent::persistence::load_progress;
    use tap_vent::platform::LocalStorage;

    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Tap Vent starting...");
    match LocalStorage::open() {
        Ok(storage) => {
            let save = load_progress(&storage);
            log::info!("Welcome back, score {}", save.stats.total_score);
        }
        Err(e) => log::warn!("Progress will not persist: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);
    log::info!("Tap Vent (native) demo session, seed {}", seed);

    if let Err(e) = demo::run(seed) {
        log::error!("Demo session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::sync::Arc;

    use tap_vent::engine::{RageMeter, SeededRng, UnlockQueue};
    use tap_vent::persistence::{self, MemoryStorage, SaveData};
    use tap_vent::platform::{Clock, ManualClock};
    use tap_vent::{Catalog, CatalogError, TapEngine, TapInput, Tuning};

    /// (taps, gap in ms) for each phase of the scripted session
    const PHASES: [(u32, u64); 4] = [(40, 300), (60, 80), (1, 4_000), (300, 120)];

    pub fn run(seed: u64) -> Result<(), CatalogError> {
        let catalog = Arc::new(Catalog::standard());
        let tuning = Tuning::default();
        let mut rage = RageMeter::new(tuning.rage);
        let mut engine = TapEngine::new(Arc::clone(&catalog), tuning, SeededRng::new(seed));
        let mut storage = MemoryStorage::new();
        let mut announcements = UnlockQueue::default();
        let clock = ManualClock::new(1_700_000_000_000);

        let mut weapon = String::from("hand");
        let mut taps = 0u32;
        let mut crits = 0u32;
        let mut best_hit = 0u64;

        for (count, gap) in PHASES {
            for _ in 0..count {
                clock.advance(gap);
                let now = clock.now_ms();
                engine.check_idle_reset(now);
                rage.register_tap(now);

                let input = TapInput::new(now, weapon.as_str(), rage.is_active(now));
                let outcome = engine.on_tap(&input)?;
                taps += 1;
                crits += outcome.is_critical as u32;
                best_hit = best_hit.max(outcome.damage);
                for event in &outcome.effect_events {
                    log::debug!("{}", event.label());
                }
                announcements.push_all(outcome.unlock_events);

                if let Err(e) = persistence::add_today_score(&mut storage, now, outcome.damage) {
                    log::warn!("Daily score not saved: {}", e);
                }

                // Swing the strongest weapon owned so far
                if let Some(best) = catalog
                    .list_weapons()
                    .iter()
                    .rev()
                    .find(|w| engine.can_wield(&w.id).unwrap_or(false))
                {
                    weapon.clone_from(&best.id);
                }
            }
            engine.record_share(clock.now_ms());
        }

        while let Some(event) = announcements.next_event() {
            println!("Unlocked {:?}: {} (+{})", event.kind, event.display_name, event.reward_score);
        }

        let save = SaveData {
            stats: engine.cumulative_stats().clone(),
            achievements: engine.achievement_state().clone(),
            current_weapon: weapon,
        };
        if let Err(e) = persistence::save_progress(&mut storage, &save) {
            log::warn!("Progress not saved: {}", e);
        }
        for notice in engine.drain_sync_notices() {
            log::info!("Would sync {:?}", notice);
        }

        let stats = engine.cumulative_stats();
        let progress = engine.achievement_progress();
        println!();
        println!("Taps:          {}", taps);
        println!("Critical hits: {}", crits);
        println!("Best hit:      {}", best_hit);
        println!("Best combo:    {}", stats.max_combo_ever_reached);
        println!("Total score:   {}", stats.total_score);
        println!("Today:         {}", persistence::today_score(&storage, clock.now_ms()));
        println!("Weapon:        {}", save.current_weapon);
        println!(
            "Achievements:  {}/{} ({}%)",
            progress.unlocked, progress.total, progress.percentage
        );
        Ok(())
    }
}
