//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall clock time
//! - Storage (LocalStorage on web)

use std::cell::Cell;

use crate::Millis;

/// Source of "now" for the host loop. The engine itself never reads a clock.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        use std::time::{SystemTime, UNIX_EPOCH};
        // A clock before 1970 reads as the epoch
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as Millis)
            .unwrap_or(0)
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        js_sys::Date::now().max(0.0) as Millis
    }
}

/// Hand-driven clock for tests and scripted sessions
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::error::StorageError;
    use crate::persistence::Storage;

    /// Browser LocalStorage
    pub struct LocalStorage {
        inner: web_sys::Storage,
    }

    impl LocalStorage {
        pub fn open() -> Result<Self, StorageError> {
            let inner = web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(StorageError::Unavailable)?;
            Ok(Self { inner })
        }
    }

    impl Storage for LocalStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get_item(key).ok().flatten()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner
                .set_item(key, value)
                .map_err(|_| StorageError::Write(key.to_string()))
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner
                .remove_item(key)
                .map_err(|_| StorageError::Write(key.to_string()))
        }
    }
}
