//! Status bar color extraction from an app's declared themes.

use crate::provider::{ThemeAttribute, ThemeId, ThemeSource};
use std::sync::Arc;
use tintbar_color::{dark_color, difference, Color};
use tintbar_prefs::AppIdentity;

/// Looks up candidate status bar colors in an app's theme resources.
///
/// Theme order: the activity's own theme, the application theme, then every
/// other activity theme the package declares. Within a theme, direct
/// attributes ([`ThemeAttribute::DIRECT`]) are tried before derived ones
/// ([`ThemeAttribute::DERIVED`]), which are darkened since a status bar is
/// conventionally a darker shade of the primary color.
pub struct ThemeColorExtractor {
    source: Arc<dyn ThemeSource>,
}

impl ThemeColorExtractor {
    pub fn new(source: Arc<dyn ThemeSource>) -> Self {
        Self { source }
    }

    /// First candidate color, or `None` if no theme attribute resolves.
    pub fn extract(&self, identity: &AppIdentity) -> Option<Color> {
        let package = identity.package_name.as_str();
        let color = self
            .theme_order(identity)
            .into_iter()
            .find_map(|theme| self.first_in_theme(package, theme));

        tracing::debug!(identity = %identity, color = ?color.map(|c| c.to_string()), "theme extraction");
        color
    }

    /// Every candidate, in lookup order.
    pub fn candidates(&self, identity: &AppIdentity) -> Vec<Color> {
        let package = identity.package_name.as_str();
        self.theme_order(identity)
            .into_iter()
            .flat_map(|theme| self.all_in_theme(package, theme))
            .collect()
    }

    /// Candidates with perceptual near-duplicates collapsed.
    ///
    /// A candidate is kept only if it differs from every earlier kept one by
    /// at least `min_difference` (see [`difference`]).
    pub fn distinct_candidates(&self, identity: &AppIdentity, min_difference: f64) -> Vec<Color> {
        let mut distinct: Vec<Color> = Vec::new();
        for color in self.candidates(identity) {
            if distinct
                .iter()
                .all(|kept| difference(*kept, color) >= min_difference)
            {
                distinct.push(color);
            }
        }
        distinct
    }

    fn theme_order(&self, identity: &AppIdentity) -> Vec<ThemeId> {
        let themes = match self.source.package_themes(&identity.package_name) {
            Ok(themes) => themes,
            Err(e) => {
                tracing::debug!(identity = %identity, error = %e, "no theme resources");
                return Vec::new();
            }
        };

        let own_activity = identity
            .activity_name
            .as_deref()
            .and_then(|name| themes.activities.iter().find(|a| a.name == name));

        let mut order: Vec<ThemeId> = Vec::new();
        let mut push = |theme: Option<ThemeId>| {
            if let Some(theme) = theme {
                if !order.contains(&theme) {
                    order.push(theme);
                }
            }
        };

        push(own_activity.and_then(|a| a.theme));
        push(themes.application_theme);
        for activity in &themes.activities {
            push(activity.theme);
        }

        order
    }

    fn lookup(&self, package: &str, theme: ThemeId, attribute: ThemeAttribute) -> Option<Color> {
        match self.source.resolve_attribute(package, theme, attribute) {
            Ok(color) => color.map(|c| c.opaque()),
            Err(e) => {
                tracing::trace!(package, theme, ?attribute, error = %e, "attribute lookup failed");
                None
            }
        }
    }

    fn first_in_theme(&self, package: &str, theme: ThemeId) -> Option<Color> {
        ThemeAttribute::DIRECT
            .iter()
            .find_map(|&attribute| self.lookup(package, theme, attribute))
            .or_else(|| {
                ThemeAttribute::DERIVED
                    .iter()
                    .find_map(|&attribute| self.lookup(package, theme, attribute).map(dark_color))
            })
    }

    fn all_in_theme(&self, package: &str, theme: ThemeId) -> Vec<Color> {
        let direct = ThemeAttribute::DIRECT
            .iter()
            .filter_map(|&attribute| self.lookup(package, theme, attribute));
        let derived = ThemeAttribute::DERIVED
            .iter()
            .filter_map(|&attribute| self.lookup(package, theme, attribute).map(dark_color));

        direct.chain(derived).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PackageSnapshot, StaticPlatform};
    use crate::provider::ActivityTheme;
    use std::collections::HashMap;

    const ACTIVITY_THEME: ThemeId = 10;
    const APP_THEME: ThemeId = 20;
    const OTHER_THEME: ThemeId = 30;

    fn platform(themes: Vec<(ThemeId, ThemeAttribute, Color)>) -> Arc<StaticPlatform> {
        let mut package = PackageSnapshot {
            version: 1,
            application_theme: Some(APP_THEME),
            activities: vec![
                ActivityTheme {
                    name: "Main".to_string(),
                    theme: Some(ACTIVITY_THEME),
                },
                ActivityTheme {
                    name: "Settings".to_string(),
                    theme: Some(OTHER_THEME),
                },
            ],
            themes: HashMap::new(),
        };
        for id in [ACTIVITY_THEME, APP_THEME, OTHER_THEME] {
            package.themes.insert(id, HashMap::new());
        }
        for (id, attribute, color) in themes {
            package.themes.entry(id).or_default().insert(attribute, color);
        }

        let platform = Arc::new(StaticPlatform::default());
        platform.install("com.app", package);
        platform
    }

    fn main_activity() -> AppIdentity {
        AppIdentity::activity("com.app", "Main")
    }

    #[test]
    fn test_activity_theme_wins_over_application_theme() {
        let source = platform(vec![
            (APP_THEME, ThemeAttribute::StatusBar, Color::rgb(1, 1, 1)),
            (ACTIVITY_THEME, ThemeAttribute::PrimaryDark, Color::rgb(2, 2, 2)),
        ]);
        let extractor = ThemeColorExtractor::new(source);
        assert_eq!(extractor.extract(&main_activity()), Some(Color::rgb(2, 2, 2)));
    }

    #[test]
    fn test_direct_attributes_win_over_derived() {
        let source = platform(vec![
            (ACTIVITY_THEME, ThemeAttribute::Primary, Color::rgb(200, 200, 200)),
            (ACTIVITY_THEME, ThemeAttribute::StatusBar, Color::rgb(9, 9, 9)),
        ]);
        let extractor = ThemeColorExtractor::new(source);
        assert_eq!(extractor.extract(&main_activity()), Some(Color::rgb(9, 9, 9)));
    }

    #[test]
    fn test_derived_attributes_are_darkened_and_opaque() {
        let source = platform(vec![(
            APP_THEME,
            ThemeAttribute::Primary,
            Color::from_argb(0x40, 200, 150, 100),
        )]);
        let extractor = ThemeColorExtractor::new(source);
        assert_eq!(extractor.extract(&main_activity()), Some(Color::rgb(130, 80, 30)));
    }

    #[test]
    fn test_falls_back_to_other_activities() {
        let source = platform(vec![(OTHER_THEME, ThemeAttribute::Accent, Color::rgb(100, 100, 100))]);
        let extractor = ThemeColorExtractor::new(source);
        assert_eq!(
            extractor.extract(&AppIdentity::package("com.app")),
            Some(Color::rgb(30, 30, 30))
        );
    }

    #[test]
    fn test_no_candidates() {
        let extractor = ThemeColorExtractor::new(platform(vec![]));
        assert_eq!(extractor.extract(&main_activity()), None);

        let missing = ThemeColorExtractor::new(Arc::new(StaticPlatform::default()));
        assert_eq!(missing.extract(&AppIdentity::package("com.none")), None);
    }

    #[test]
    fn test_extract_stops_at_first_hit() {
        let source = platform(vec![(
            ACTIVITY_THEME,
            ThemeAttribute::StatusBarDark,
            Color::rgb(5, 5, 5),
        )]);
        let extractor = ThemeColorExtractor::new(source.clone());
        extractor.extract(&main_activity());
        assert_eq!(source.attribute_lookups(), 1);
    }

    #[test]
    fn test_distinct_candidates_collapse_near_duplicates() {
        let source = platform(vec![
            (ACTIVITY_THEME, ThemeAttribute::StatusBar, Color::rgb(100, 100, 100)),
            (ACTIVITY_THEME, ThemeAttribute::PrimaryDark, Color::rgb(101, 100, 100)),
            (APP_THEME, ThemeAttribute::StatusBar, Color::rgb(200, 10, 10)),
        ]);
        let extractor = ThemeColorExtractor::new(source);

        assert_eq!(extractor.candidates(&main_activity()).len(), 3);
        assert_eq!(
            extractor.distinct_candidates(&main_activity(), 5.0),
            vec![Color::rgb(100, 100, 100), Color::rgb(200, 10, 10)]
        );
    }
}
