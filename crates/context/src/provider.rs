//! Provider traits for platform capabilities.
//!
//! These traits abstract the package manager, home screen resolution and
//! theme resources, allowing the resolution logic to remain pure and testable.

use serde::{Deserialize, Serialize};
use tintbar_color::Color;
use tintbar_prefs::AppIdentity;

/// Opaque theme resource identifier.
pub type ThemeId = u32;

/// Why package metadata could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("package not found: {0}")]
    PackageNotFound(String),

    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

/// Why a theme resource could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeLookupError {
    #[error("resources unavailable for package {0}")]
    ResourcesUnavailable(String),

    #[error("resource not found: {0}")]
    NotFound(String),
}

/// Metadata of a resolved activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityInfo {
    pub identity: AppIdentity,

    /// Monotonic app version, bumped on update or reinstall.
    pub version: i64,
}

/// Theme attributes consulted when extracting a status bar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThemeAttribute {
    /// Status-bar-specific dark color attribute.
    StatusBarDark,
    /// Explicit status bar color attribute.
    StatusBar,
    /// Primary-dark color resource.
    PrimaryDark,
    /// Primary color attribute.
    Primary,
    /// Navigation bar color attribute.
    NavigationBar,
    /// Accent color resource.
    Accent,
}

impl ThemeAttribute {
    /// Attributes whose value is used as-is, in priority order.
    pub const DIRECT: &'static [ThemeAttribute] = &[
        ThemeAttribute::StatusBarDark,
        ThemeAttribute::StatusBar,
        ThemeAttribute::PrimaryDark,
    ];

    /// Attributes darkened before use, in priority order.
    pub const DERIVED: &'static [ThemeAttribute] = &[
        ThemeAttribute::Primary,
        ThemeAttribute::NavigationBar,
        ThemeAttribute::Accent,
    ];
}

/// A declared activity and the theme it applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTheme {
    pub name: String,
    #[serde(default)]
    pub theme: Option<ThemeId>,
}

/// Every theme a package declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageThemes {
    #[serde(default)]
    pub application_theme: Option<ThemeId>,
    #[serde(default)]
    pub activities: Vec<ActivityTheme>,
}

/// Provider for package and activity metadata.
pub trait PackageProvider: Send + Sync {
    /// Metadata for the activity `class_name` declared by `package_name`.
    fn activity_info(&self, package_name: &str, class_name: &str)
        -> Result<ActivityInfo, LookupError>;
}

/// Provider for the device's default home screen.
pub trait HomeResolver: Send + Sync {
    fn default_home_package(&self) -> Option<String>;
}

/// Provider for an application's theme resources.
///
/// Lookups may be slow (each one can load a resource table); callers must
/// keep them off event-delivery threads.
pub trait ThemeSource: Send + Sync {
    fn package_themes(&self, package_name: &str) -> Result<PackageThemes, ThemeLookupError>;

    /// Value of `attribute` in `theme`, or `None` if the theme doesn't set it.
    fn resolve_attribute(
        &self,
        package_name: &str,
        theme: ThemeId,
        attribute: ThemeAttribute,
    ) -> Result<Option<Color>, ThemeLookupError>;
}

/// Null implementation for testing or unsupported platforms.
pub struct NullProvider;

impl PackageProvider for NullProvider {
    fn activity_info(
        &self,
        package_name: &str,
        _class_name: &str,
    ) -> Result<ActivityInfo, LookupError> {
        Err(LookupError::PackageNotFound(package_name.to_string()))
    }
}

impl HomeResolver for NullProvider {
    fn default_home_package(&self) -> Option<String> {
        None
    }
}

impl ThemeSource for NullProvider {
    fn package_themes(&self, package_name: &str) -> Result<PackageThemes, ThemeLookupError> {
        Err(ThemeLookupError::ResourcesUnavailable(package_name.to_string()))
    }

    fn resolve_attribute(
        &self,
        _package_name: &str,
        _theme: ThemeId,
        _attribute: ThemeAttribute,
    ) -> Result<Option<Color>, ThemeLookupError> {
        Ok(None)
    }
}
