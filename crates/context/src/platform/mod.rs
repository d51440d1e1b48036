//! Platform implementations of the provider traits.
//!
//! [`StaticPlatform`] serves package metadata and theme resources from an
//! in-memory snapshot. The replay binary loads one from JSON; tests build one
//! in code and mutate it (app updates, uninstalls) between events.

use crate::provider::{
    ActivityInfo, ActivityTheme, HomeResolver, LookupError, PackageProvider, PackageThemes,
    ThemeAttribute, ThemeId, ThemeLookupError, ThemeSource,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tintbar_color::Color;
use tintbar_prefs::AppIdentity;

/// One installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageSnapshot {
    pub version: i64,
    pub application_theme: Option<ThemeId>,
    pub activities: Vec<ActivityTheme>,
    /// Attribute values per theme.
    pub themes: HashMap<ThemeId, HashMap<ThemeAttribute, Color>>,
}

/// Every installed package plus the default home screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformSnapshot {
    pub home_package: Option<String>,
    pub packages: HashMap<String, PackageSnapshot>,
}

/// Snapshot-backed platform.
#[derive(Debug, Default)]
pub struct StaticPlatform {
    snapshot: RwLock<PlatformSnapshot>,
    attribute_lookups: AtomicUsize,
}

impl StaticPlatform {
    pub fn new(snapshot: PlatformSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            attribute_lookups: AtomicUsize::new(0),
        }
    }

    /// Install or replace a package.
    pub fn install(&self, package_name: impl Into<String>, package: PackageSnapshot) {
        if let Ok(mut snapshot) = self.snapshot.write() {
            snapshot.packages.insert(package_name.into(), package);
        }
    }

    pub fn uninstall(&self, package_name: &str) {
        if let Ok(mut snapshot) = self.snapshot.write() {
            snapshot.packages.remove(package_name);
        }
    }

    /// Simulate an app update: bump the version, optionally change a theme.
    pub fn update(&self, package_name: &str, theme: Option<(ThemeId, ThemeAttribute, Color)>) {
        if let Ok(mut snapshot) = self.snapshot.write() {
            if let Some(package) = snapshot.packages.get_mut(package_name) {
                package.version += 1;
                if let Some((id, attribute, color)) = theme {
                    package.themes.entry(id).or_default().insert(attribute, color);
                }
            }
        }
    }

    pub fn set_home_package(&self, package_name: Option<String>) {
        if let Ok(mut snapshot) = self.snapshot.write() {
            snapshot.home_package = package_name;
        }
    }

    /// Number of theme attribute lookups served so far.
    pub fn attribute_lookups(&self) -> usize {
        self.attribute_lookups.load(Ordering::SeqCst)
    }
}

impl PackageProvider for StaticPlatform {
    fn activity_info(
        &self,
        package_name: &str,
        class_name: &str,
    ) -> Result<ActivityInfo, LookupError> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| LookupError::PermissionDenied(package_name.to_string()))?;
        let package = snapshot
            .packages
            .get(package_name)
            .ok_or_else(|| LookupError::PackageNotFound(package_name.to_string()))?;

        if !package.activities.iter().any(|a| a.name == class_name) {
            return Err(LookupError::ActivityNotFound(format!(
                "{package_name}/{class_name}"
            )));
        }

        Ok(ActivityInfo {
            identity: AppIdentity::activity(package_name, class_name),
            version: package.version,
        })
    }
}

impl HomeResolver for StaticPlatform {
    fn default_home_package(&self) -> Option<String> {
        self.snapshot
            .read()
            .ok()
            .and_then(|snapshot| snapshot.home_package.clone())
    }
}

impl ThemeSource for StaticPlatform {
    fn package_themes(&self, package_name: &str) -> Result<PackageThemes, ThemeLookupError> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| ThemeLookupError::ResourcesUnavailable(package_name.to_string()))?;
        let package = snapshot
            .packages
            .get(package_name)
            .ok_or_else(|| ThemeLookupError::ResourcesUnavailable(package_name.to_string()))?;

        Ok(PackageThemes {
            application_theme: package.application_theme,
            activities: package.activities.clone(),
        })
    }

    fn resolve_attribute(
        &self,
        package_name: &str,
        theme: ThemeId,
        attribute: ThemeAttribute,
    ) -> Result<Option<Color>, ThemeLookupError> {
        self.attribute_lookups.fetch_add(1, Ordering::SeqCst);

        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| ThemeLookupError::ResourcesUnavailable(package_name.to_string()))?;
        let package = snapshot
            .packages
            .get(package_name)
            .ok_or_else(|| ThemeLookupError::ResourcesUnavailable(package_name.to_string()))?;
        let values = package
            .themes
            .get(&theme)
            .ok_or_else(|| ThemeLookupError::NotFound(format!("{package_name} theme {theme}")))?;

        Ok(values.get(&attribute).copied())
    }
}
