//! Color resolution: the precedence chain from stored preferences to theme
//! extraction.
//!
//! Pure decision logic over a [`ResolverConfig`] snapshot; the only side
//! effect is the cache write after a successful extraction.

use crate::cache::ColorCache;
use crate::state::{ColorSource, HostConfig, ResolvedState};
use crate::theme::ThemeColorExtractor;
use serde::{Deserialize, Serialize};
use tintbar_color::Color;
use tintbar_prefs::{
    AppIdentity, PreferenceKey, PreferenceStore, PreferenceStoreRef, VersionedPreference,
};

/// Global settings the precedence chain depends on, captured once per
/// resolution so a concurrent preference edit can't split a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    pub auto_color: bool,
    pub home_transparent: bool,
    pub manual_color: Color,
    pub system_ui_package: String,
}

impl ResolverConfig {
    pub fn capture(store: &dyn PreferenceStore, host: &HostConfig) -> Self {
        Self {
            auto_color: store.flag(PreferenceKey::AutoColor),
            home_transparent: store.flag(PreferenceKey::HomeTransparent),
            manual_color: store.global_color(PreferenceKey::ManualColor),
            system_ui_package: host.system_ui_package.clone(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            auto_color: true,
            home_transparent: true,
            manual_color: Color::BLACK,
            system_ui_package: crate::state::SYSTEM_UI_PACKAGE.to_string(),
        }
    }
}

/// Extraction still to run before the state can be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExtraction {
    pub identity: AppIdentity,
    pub version: i64,
    pub is_fullscreen: bool,
    /// Color used if extraction finds nothing.
    pub fallback: Color,
}

/// Outcome of the synchronous planning phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedState),
    NeedsExtraction(PendingExtraction),
}

/// Applies the precedence chain for one foreground identity.
pub struct ColorResolver {
    prefs: PreferenceStoreRef,
    cache: ColorCache,
    extractor: ThemeColorExtractor,
}

impl ColorResolver {
    pub fn new(prefs: PreferenceStoreRef, extractor: ThemeColorExtractor) -> Self {
        Self {
            cache: ColorCache::new(prefs.clone()),
            prefs,
            extractor,
        }
    }

    pub fn cache(&self) -> &ColorCache {
        &self.cache
    }

    pub fn extractor(&self) -> &ThemeColorExtractor {
        &self.extractor
    }

    /// Run every step that doesn't need theme extraction.
    ///
    /// Precedence:
    /// 1. Explicit stored color (unless home with transparency on)
    /// 2. Home screen: transparent
    /// 3. Auto color off: manual color
    /// 4. System shell: manual color, never fullscreen
    /// 5. Valid cache entry
    /// 6. Extraction (deferred to [`ColorResolver::complete`])
    pub fn plan(
        &self,
        identity: &AppIdentity,
        version: i64,
        is_home: bool,
        config: &ResolverConfig,
    ) -> Resolution {
        let stored = VersionedPreference::load(self.prefs.as_ref(), identity);
        let is_fullscreen = stored.is_fullscreen.unwrap_or(false);

        if let Some(color) = stored.color {
            if !is_home || !config.home_transparent {
                return self.decided(ResolvedState::opaque(
                    identity,
                    color,
                    is_fullscreen,
                    ColorSource::Explicit,
                ));
            }
        }

        if is_home {
            return self.decided(ResolvedState::transparent(identity, is_fullscreen));
        }

        if !config.auto_color {
            return self.decided(ResolvedState::opaque(
                identity,
                config.manual_color,
                is_fullscreen,
                ColorSource::Manual,
            ));
        }

        if identity.package_name == config.system_ui_package {
            return self.decided(ResolvedState::opaque(
                identity,
                config.manual_color,
                false,
                ColorSource::SystemShell,
            ));
        }

        if let Some(color) = self.cache.get(identity, version) {
            return self.decided(ResolvedState::opaque(
                identity,
                color,
                is_fullscreen,
                ColorSource::Cache,
            ));
        }

        Resolution::NeedsExtraction(PendingExtraction {
            identity: identity.clone(),
            version,
            is_fullscreen,
            fallback: config.manual_color,
        })
    }

    /// The slow step. Run it on a blocking worker.
    pub fn extract(&self, pending: &PendingExtraction) -> Option<Color> {
        self.extractor.extract(&pending.identity)
    }

    /// Finish a deferred resolution, caching a successful extraction.
    pub fn complete(&self, pending: &PendingExtraction, extracted: Option<Color>) -> ResolvedState {
        match extracted {
            Some(color) => {
                if let Err(e) = self.cache.put(&pending.identity, color, pending.version) {
                    tracing::warn!(identity = %pending.identity, error = %e, "failed to cache color");
                }
                self.log(ResolvedState::opaque(
                    &pending.identity,
                    color,
                    pending.is_fullscreen,
                    ColorSource::Extracted,
                ))
            }
            None => self.log(ResolvedState::opaque(
                &pending.identity,
                pending.fallback,
                pending.is_fullscreen,
                ColorSource::Fallback,
            )),
        }
    }

    /// Plan, extract and complete inline.
    pub fn resolve(
        &self,
        identity: &AppIdentity,
        version: i64,
        is_home: bool,
        config: &ResolverConfig,
    ) -> ResolvedState {
        match self.plan(identity, version, is_home, config) {
            Resolution::Resolved(state) => state,
            Resolution::NeedsExtraction(pending) => {
                let extracted = self.extract(&pending);
                self.complete(&pending, extracted)
            }
        }
    }

    fn decided(&self, state: ResolvedState) -> Resolution {
        Resolution::Resolved(self.log(state))
    }

    fn log(&self, state: ResolvedState) -> ResolvedState {
        tracing::debug!(
            package = ?state.package_name,
            activity = ?state.activity_name,
            source = ?state.source,
            color = %state.color,
            transparent = state.is_transparent,
            fullscreen = state.is_fullscreen,
            "color resolved"
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PackageSnapshot, StaticPlatform};
    use crate::provider::{ActivityTheme, ThemeAttribute};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tintbar_prefs::InMemoryPreferenceStore;

    const THEME_COLOR: Color = Color::rgb(0x12, 0x34, 0x56);

    struct Fixture {
        platform: Arc<StaticPlatform>,
        prefs: Arc<InMemoryPreferenceStore>,
        resolver: ColorResolver,
    }

    fn fixture(prefs: InMemoryPreferenceStore) -> Fixture {
        let platform = Arc::new(StaticPlatform::default());
        platform.install(
            "com.mail",
            PackageSnapshot {
                version: 1,
                application_theme: Some(1),
                activities: vec![ActivityTheme {
                    name: "Inbox".to_string(),
                    theme: None,
                }],
                themes: HashMap::from([(
                    1,
                    HashMap::from([(ThemeAttribute::StatusBar, THEME_COLOR)]),
                )]),
            },
        );

        let prefs = Arc::new(prefs);
        let resolver = ColorResolver::new(prefs.clone(), ThemeColorExtractor::new(platform.clone()));
        Fixture {
            platform,
            prefs,
            resolver,
        }
    }

    fn inbox() -> AppIdentity {
        AppIdentity::activity("com.mail", "Inbox")
    }

    fn config(prefs: &InMemoryPreferenceStore) -> ResolverConfig {
        ResolverConfig::capture(prefs, &HostConfig::default())
    }

    #[test]
    fn test_explicit_color_wins() {
        let f = fixture(
            InMemoryPreferenceStore::new()
                .with(PreferenceKey::Color, Some(&inbox()), Color::WHITE)
                .with(PreferenceKey::Fullscreen, Some(&inbox()), true),
        );
        let state = f.resolver.resolve(&inbox(), 1, false, &config(&f.prefs));

        assert_eq!(state.source, ColorSource::Explicit);
        assert_eq!(state.color, Color::WHITE);
        assert!(state.is_fullscreen);
        assert_eq!(f.platform.attribute_lookups(), 0);
    }

    #[test]
    fn test_package_color_applies_to_its_activities() {
        let mail = AppIdentity::package("com.mail");
        let f = fixture(
            InMemoryPreferenceStore::new().with(PreferenceKey::Color, Some(&mail), Color::WHITE),
        );
        let state = f.resolver.resolve(&inbox(), 1, false, &config(&f.prefs));

        assert_eq!(state.source, ColorSource::Explicit);
        assert_eq!(state.color, Color::WHITE);
        assert_eq!(f.platform.attribute_lookups(), 0);
    }

    #[test]
    fn test_home_with_transparency_ignores_explicit_color() {
        let f = fixture(
            InMemoryPreferenceStore::new()
                .with(PreferenceKey::Color, Some(&inbox()), Color::WHITE)
                .with(PreferenceKey::AutoColor, None, false),
        );
        let state = f.resolver.resolve(&inbox(), 1, true, &config(&f.prefs));
        assert!(state.is_transparent);
        assert_eq!(state.source, ColorSource::Home);
    }

    #[test]
    fn test_home_without_transparency_keeps_explicit_color() {
        let f = fixture(
            InMemoryPreferenceStore::new()
                .with(PreferenceKey::Color, Some(&inbox()), Color::WHITE)
                .with(PreferenceKey::HomeTransparent, None, false),
        );
        let state = f.resolver.resolve(&inbox(), 1, true, &config(&f.prefs));
        assert!(!state.is_transparent);
        assert_eq!(state.color, Color::WHITE);
    }

    #[test]
    fn test_home_is_transparent_regardless_of_auto_color() {
        for auto_color in [true, false] {
            let f = fixture(InMemoryPreferenceStore::new().with(
                PreferenceKey::AutoColor,
                None,
                auto_color,
            ));
            let state = f.resolver.resolve(&inbox(), 1, true, &config(&f.prefs));
            assert!(state.is_transparent, "auto_color = {auto_color}");
        }
    }

    #[test]
    fn test_manual_color_when_auto_disabled() {
        let manual = Color::rgb(9, 8, 7);
        let f = fixture(
            InMemoryPreferenceStore::new()
                .with(PreferenceKey::AutoColor, None, false)
                .with(PreferenceKey::ManualColor, None, manual),
        );
        let state = f.resolver.resolve(&inbox(), 1, false, &config(&f.prefs));
        assert_eq!(state.source, ColorSource::Manual);
        assert_eq!(state.color, manual);
    }

    #[test]
    fn test_system_shell_forces_manual_color_and_no_fullscreen() {
        let shell = AppIdentity::activity(crate::state::SYSTEM_UI_PACKAGE, "Recents");
        let f = fixture(InMemoryPreferenceStore::new().with(
            PreferenceKey::Fullscreen,
            Some(&shell),
            true,
        ));
        let state = f.resolver.resolve(&shell, 1, false, &config(&f.prefs));
        assert_eq!(state.source, ColorSource::SystemShell);
        assert!(!state.is_fullscreen);
    }

    #[test]
    fn test_extraction_populates_cache_and_cache_skips_extraction() {
        let f = fixture(InMemoryPreferenceStore::new());
        let cfg = config(&f.prefs);

        let first = f.resolver.resolve(&inbox(), 1, false, &cfg);
        assert_eq!(first.source, ColorSource::Extracted);
        assert_eq!(first.color, THEME_COLOR);
        let lookups = f.platform.attribute_lookups();
        assert!(lookups > 0);

        let second = f.resolver.resolve(&inbox(), 1, false, &cfg);
        assert_eq!(second.source, ColorSource::Cache);
        assert_eq!(second.color, THEME_COLOR);
        assert_eq!(f.platform.attribute_lookups(), lookups);
    }

    #[test]
    fn test_version_bump_forces_reextraction() {
        let f = fixture(InMemoryPreferenceStore::new());
        let cfg = config(&f.prefs);

        f.resolver.resolve(&inbox(), 1, false, &cfg);
        f.platform
            .update("com.mail", Some((1, ThemeAttribute::StatusBar, Color::WHITE)));

        let state = f.resolver.resolve(&inbox(), 2, false, &cfg);
        assert_eq!(state.source, ColorSource::Extracted);
        assert_eq!(state.color, Color::WHITE);
        assert_eq!(f.resolver.cache().get(&inbox(), 2), Some(Color::WHITE));
    }

    #[test]
    fn test_extraction_failure_falls_back_without_caching() {
        let manual = Color::rgb(1, 2, 3);
        let f = fixture(InMemoryPreferenceStore::new().with(PreferenceKey::ManualColor, None, manual));
        let unknown = AppIdentity::activity("com.unknown", "Main");

        let state = f.resolver.resolve(&unknown, 1, false, &config(&f.prefs));
        assert_eq!(state.source, ColorSource::Fallback);
        assert_eq!(state.color, manual);
        assert_eq!(f.resolver.cache().get(&unknown, 1), None);
    }

    #[test]
    fn test_plan_defers_extraction() {
        let f = fixture(InMemoryPreferenceStore::new());
        match f.resolver.plan(&inbox(), 1, false, &config(&f.prefs)) {
            Resolution::NeedsExtraction(pending) => {
                assert_eq!(pending.identity, inbox());
                assert_eq!(pending.version, 1);
            }
            other => panic!("expected extraction, got {other:?}"),
        }
        assert_eq!(f.platform.attribute_lookups(), 0);
    }
}
