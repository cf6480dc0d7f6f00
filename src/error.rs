//! Error types
//!
//! Catalog errors mostly indicate a content/build defect: an id that does not
//! exist, or a definition that breaks an invariant. Callers are expected to
//! treat those as fatal rather than recover mid-session. `WeaponLocked` is the
//! exception: the player picked something they haven't earned yet.

/// Errors raised while building or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown weapon id '{0}'")]
    UnknownWeapon(String),

    #[error("unknown achievement id '{0}'")]
    UnknownAchievement(String),

    #[error("weapon '{0}' is still locked")]
    WeaponLocked(String),

    #[error("duplicate catalog id '{0}'")]
    DuplicateId(String),

    #[error("weapon '{0}' has an invalid definition: {1}")]
    InvalidWeapon(String, &'static str),

    #[error("weapon '{0}' has an invalid effect: {1}")]
    InvalidEffect(String, &'static str),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while loading engine tuning.
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("invalid tuning value for '{0}': {1}")]
    Invalid(&'static str, &'static str),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by a storage backend. Never surfaced to the engine.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,

    #[error("failed to write key '{0}'")]
    Write(String),

    #[error("failed to encode save data: {0}")]
    Encode(#[from] serde_json::Error),
}
