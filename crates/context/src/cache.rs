//! Version-gated cache of extracted colors.

use std::sync::Mutex;
use tintbar_color::Color;
use tintbar_prefs::{AppIdentity, PreferenceKey, PreferenceStoreRef, PrefsError};

/// Per-activity color cache stored in the preference store.
///
/// An entry is only valid while its recorded version equals the app's
/// current version; anything else is a miss. The color and version fields
/// are written and read under one lock so a reader never pairs a new color
/// with an old version.
pub struct ColorCache {
    store: PreferenceStoreRef,
    lock: Mutex<()>,
}

impl ColorCache {
    pub fn new(store: PreferenceStoreRef) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn get(&self, identity: &AppIdentity, current_version: i64) -> Option<Color> {
        let _guard = self.lock.lock().ok()?;
        let id = Some(identity);

        let version = self.store.get_int(PreferenceKey::CacheVersion, id)?;
        if version != current_version {
            tracing::debug!(
                identity = %identity,
                cached = version,
                current = current_version,
                "color cache stale"
            );
            return None;
        }

        self.store.get_color(PreferenceKey::CacheColor, id)
    }

    /// Overwrite the entry for `identity`.
    pub fn put(&self, identity: &AppIdentity, color: Color, version: i64) -> Result<(), PrefsError> {
        let _guard = self.lock.lock().map_err(|_| PrefsError::Poisoned)?;
        let id = Some(identity);

        self.store
            .put(PreferenceKey::CacheColor, id, color.into())?;
        self.store
            .put(PreferenceKey::CacheVersion, id, version.into())?;
        Ok(())
    }

    pub fn invalidate(&self, identity: &AppIdentity) -> Result<(), PrefsError> {
        let _guard = self.lock.lock().map_err(|_| PrefsError::Poisoned)?;
        let id = Some(identity);

        self.store.remove(PreferenceKey::CacheVersion, id)?;
        self.store.remove(PreferenceKey::CacheColor, id)?;
        Ok(())
    }
}
