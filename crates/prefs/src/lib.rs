//! Preference storage for tintbar.
//!
//! The resolution engine consumes preferences through the [`PreferenceStore`]
//! key/value contract. Global flags (auto color, home transparency, compat
//! notifications, ...) live beside per-app values (explicit color, fullscreen,
//! notification visibility, cached color and its version) keyed by
//! [`AppIdentity`].

mod identity;
mod key;
mod sqlite;
mod store;

pub use identity::AppIdentity;
pub use key::{PreferenceKey, PreferenceValue, Scope};
pub use sqlite::SqlitePreferenceStore;
pub use store::{InMemoryPreferenceStore, PreferenceStore, PreferenceStoreRef, VersionedPreference};

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("preference store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, PrefsError>;
