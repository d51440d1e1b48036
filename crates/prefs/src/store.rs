//! The preference store contract and an in-memory implementation.

use crate::key::{PreferenceKey, PreferenceValue};
use crate::{AppIdentity, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tintbar_color::Color;

/// Key/value preference storage, global or scoped to an [`AppIdentity`].
///
/// Implementations guard their own state; callers may share one store across
/// threads and treat every call as atomic.
pub trait PreferenceStore: Send + Sync {
    /// Raw stored value, without defaults applied.
    fn get(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Option<PreferenceValue>;

    fn put(
        &self,
        key: PreferenceKey,
        identity: Option<&AppIdentity>,
        value: PreferenceValue,
    ) -> Result<()>;

    fn remove(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Result<()>;

    fn get_bool(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Option<bool> {
        self.get(key, identity).and_then(|v| v.as_bool())
    }

    fn get_int(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Option<i64> {
        self.get(key, identity).and_then(|v| v.as_int())
    }

    fn get_color(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Option<Color> {
        self.get(key, identity).and_then(|v| v.as_color())
    }

    /// Global boolean flag with its default applied.
    fn flag(&self, key: PreferenceKey) -> bool {
        self.get_bool(key, None)
            .or_else(|| key.default_value().and_then(|v| v.as_bool()))
            .unwrap_or(false)
    }

    /// Global color with its default applied.
    fn global_color(&self, key: PreferenceKey) -> Color {
        self.get_color(key, None)
            .or_else(|| key.default_value().and_then(|v| v.as_color()))
            .unwrap_or_default()
    }
}

/// Type alias for shared preference store reference.
pub type PreferenceStoreRef = Arc<dyn PreferenceStore>;

/// All per-app preferences of one identity, read in one pass.
///
/// User settings on an activity fall back to the ones on its package. The
/// cache fields are per identity and never fall back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionedPreference {
    pub color: Option<Color>,
    pub is_fullscreen: Option<bool>,
    pub is_notifications_enabled: Option<bool>,
    pub cached_color: Option<Color>,
    pub cache_version: Option<i64>,
}

impl VersionedPreference {
    pub fn load(store: &dyn PreferenceStore, identity: &AppIdentity) -> Self {
        let id = Some(identity);
        let mut prefs = Self {
            color: store.get_color(PreferenceKey::Color, id),
            is_fullscreen: store.get_bool(PreferenceKey::Fullscreen, id),
            is_notifications_enabled: store.get_bool(PreferenceKey::Notifications, id),
            cached_color: store.get_color(PreferenceKey::CacheColor, id),
            cache_version: store.get_int(PreferenceKey::CacheVersion, id),
        };

        if identity.is_activity() {
            let package = identity.package_identity();
            let package = Some(&package);
            prefs.color = prefs
                .color
                .or_else(|| store.get_color(PreferenceKey::Color, package));
            prefs.is_fullscreen = prefs
                .is_fullscreen
                .or_else(|| store.get_bool(PreferenceKey::Fullscreen, package));
            prefs.is_notifications_enabled = prefs
                .is_notifications_enabled
                .or_else(|| store.get_bool(PreferenceKey::Notifications, package));
        }
        prefs
    }
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    values: RwLock<HashMap<String, PreferenceValue>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style put for test setup.
    pub fn with(
        self,
        key: PreferenceKey,
        identity: Option<&AppIdentity>,
        value: impl Into<PreferenceValue>,
    ) -> Self {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.storage_key(identity), value.into());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Option<PreferenceValue> {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(&key.storage_key(identity)).copied())
    }

    fn put(
        &self,
        key: PreferenceKey,
        identity: Option<&AppIdentity>,
        value: PreferenceValue,
    ) -> Result<()> {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.storage_key(identity), value);
        }
        Ok(())
    }

    fn remove(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Result<()> {
        if let Ok(mut values) = self.values.write() {
            values.remove(&key.storage_key(identity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_fall_back_to_defaults() {
        let store = InMemoryPreferenceStore::new();
        assert!(store.flag(PreferenceKey::AutoColor));
        assert!(!store.flag(PreferenceKey::NotificationsCompat));
        assert_eq!(store.global_color(PreferenceKey::ManualColor), Color::BLACK);

        store
            .put(PreferenceKey::AutoColor, None, false.into())
            .unwrap();
        assert!(!store.flag(PreferenceKey::AutoColor));
    }

    #[test]
    fn test_app_scoped_values_are_isolated() {
        let inbox = AppIdentity::activity("com.mail", "Inbox");
        let compose = AppIdentity::activity("com.mail", "Compose");
        let store =
            InMemoryPreferenceStore::new().with(PreferenceKey::Color, Some(&inbox), Color::WHITE);

        assert_eq!(
            store.get_color(PreferenceKey::Color, Some(&inbox)),
            Some(Color::WHITE)
        );
        assert_eq!(store.get_color(PreferenceKey::Color, Some(&compose)), None);
    }

    #[test]
    fn test_versioned_preference_load() {
        let id = AppIdentity::activity("com.mail", "Inbox");
        let store = InMemoryPreferenceStore::new()
            .with(PreferenceKey::CacheColor, Some(&id), Color::WHITE)
            .with(PreferenceKey::CacheVersion, Some(&id), 12i64)
            .with(PreferenceKey::Fullscreen, Some(&id), true);

        let prefs = VersionedPreference::load(&store, &id);
        assert_eq!(prefs.cached_color, Some(Color::WHITE));
        assert_eq!(prefs.cache_version, Some(12));
        assert_eq!(prefs.is_fullscreen, Some(true));
        assert_eq!(prefs.color, None);
    }

    #[test]
    fn test_activity_settings_fall_back_to_package() {
        let mail = AppIdentity::package("com.mail");
        let inbox = AppIdentity::activity("com.mail", "Inbox");
        let store = InMemoryPreferenceStore::new()
            .with(PreferenceKey::Color, Some(&mail), Color::WHITE)
            .with(PreferenceKey::Fullscreen, Some(&mail), true)
            .with(PreferenceKey::Fullscreen, Some(&inbox), false)
            .with(PreferenceKey::CacheColor, Some(&mail), Color::BLACK);

        let prefs = VersionedPreference::load(&store, &inbox);
        assert_eq!(prefs.color, Some(Color::WHITE));
        assert_eq!(prefs.is_fullscreen, Some(false));
        assert_eq!(prefs.is_notifications_enabled, None);
        assert_eq!(prefs.cached_color, None);

        let prefs = VersionedPreference::load(&store, &mail);
        assert_eq!(prefs.cached_color, Some(Color::BLACK));
    }

    #[test]
    fn test_remove() {
        let store = InMemoryPreferenceStore::new().with(PreferenceKey::HideOnVolume, None, false);
        assert_eq!(store.len(), 1);
        store.remove(PreferenceKey::HideOnVolume, None).unwrap();
        assert!(store.is_empty());
        assert!(store.flag(PreferenceKey::HideOnVolume));
    }
}
