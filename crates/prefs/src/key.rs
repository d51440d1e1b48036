//! Preference keys, values and their defaults.

use crate::AppIdentity;
use serde::{Deserialize, Serialize};
use tintbar_color::Color;

/// Whether a key lives once per install or once per app/activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    App,
}

/// Every preference the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKey {
    /// Master switch for the overlay.
    StatusEnabled,
    /// Derive colors from app themes instead of using the manual color.
    AutoColor,
    /// Make the overlay transparent over the home screen.
    HomeTransparent,
    /// Fallback color when auto color is off or yields nothing.
    ManualColor,
    /// Observe notifications through the compat path instead of the listener.
    NotificationsCompat,
    /// Hide behind the system volume panel.
    HideOnVolume,
    /// Attempt permission-gated lookups even when the permission is missing.
    IgnorePermissionChecks,

    /// Explicit per-activity color.
    Color,
    /// Per-activity fullscreen flag.
    Fullscreen,
    /// Per-app notification visibility.
    Notifications,
    /// Last extracted color.
    CacheColor,
    /// App version the cached color was extracted from.
    CacheVersion,
}

impl PreferenceKey {
    pub const GLOBALS: &'static [PreferenceKey] = &[
        PreferenceKey::StatusEnabled,
        PreferenceKey::AutoColor,
        PreferenceKey::HomeTransparent,
        PreferenceKey::ManualColor,
        PreferenceKey::NotificationsCompat,
        PreferenceKey::HideOnVolume,
        PreferenceKey::IgnorePermissionChecks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PreferenceKey::StatusEnabled => "status_enabled",
            PreferenceKey::AutoColor => "auto_color",
            PreferenceKey::HomeTransparent => "home_transparent",
            PreferenceKey::ManualColor => "manual_color",
            PreferenceKey::NotificationsCompat => "notifications_compat",
            PreferenceKey::HideOnVolume => "hide_on_volume",
            PreferenceKey::IgnorePermissionChecks => "ignore_permission_checks",
            PreferenceKey::Color => "color",
            PreferenceKey::Fullscreen => "fullscreen",
            PreferenceKey::Notifications => "notifications",
            PreferenceKey::CacheColor => "cache_color",
            PreferenceKey::CacheVersion => "cache_version",
        }
    }

    pub fn scope(&self) -> Scope {
        if Self::GLOBALS.contains(self) {
            Scope::Global
        } else {
            Scope::App
        }
    }

    /// Value assumed when nothing is stored.
    ///
    /// Per-app keys have no default: "unset" is meaningful to the resolver.
    pub fn default_value(&self) -> Option<PreferenceValue> {
        match self {
            PreferenceKey::StatusEnabled => Some(PreferenceValue::Bool(true)),
            PreferenceKey::AutoColor => Some(PreferenceValue::Bool(true)),
            PreferenceKey::HomeTransparent => Some(PreferenceValue::Bool(true)),
            PreferenceKey::ManualColor => Some(PreferenceValue::Color(Color::BLACK)),
            PreferenceKey::NotificationsCompat => Some(PreferenceValue::Bool(false)),
            PreferenceKey::HideOnVolume => Some(PreferenceValue::Bool(true)),
            PreferenceKey::IgnorePermissionChecks => Some(PreferenceValue::Bool(false)),
            _ => None,
        }
    }

    /// Flat string key used by backing stores.
    ///
    /// Global keys ignore `identity`; app keys are prefixed with it.
    pub fn storage_key(&self, identity: Option<&AppIdentity>) -> String {
        match (self.scope(), identity) {
            (Scope::App, Some(identity)) => format!("{identity}:{}", self.name()),
            _ => self.name().to_string(),
        }
    }
}

/// A stored preference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Color(Color),
}

impl PreferenceValue {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            PreferenceValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            PreferenceValue::Int(i) => Some(i),
            PreferenceValue::Color(c) => Some(c.argb() as i64),
            PreferenceValue::Bool(_) => None,
        }
    }

    /// Colors may have been stored as plain integers by older writers.
    pub fn as_color(&self) -> Option<Color> {
        match *self {
            PreferenceValue::Color(c) => Some(c),
            PreferenceValue::Int(i) => u32::try_from(i).ok().map(Color::from_argb_u32),
            PreferenceValue::Bool(_) => None,
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(b: bool) -> Self {
        PreferenceValue::Bool(b)
    }
}

impl From<i64> for PreferenceValue {
    fn from(i: i64) -> Self {
        PreferenceValue::Int(i)
    }
}

impl From<Color> for PreferenceValue {
    fn from(c: Color) -> Self {
        PreferenceValue::Color(c)
    }
}
