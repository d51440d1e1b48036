//! Resolved overlay state and host configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tintbar_color::Color;
use tintbar_events::{NotificationRecord, StateUpdate};
use tintbar_prefs::AppIdentity;

/// Default window the volume overlay debounce waits after the last signal.
pub const DEFAULT_VOLUME_DEBOUNCE: Duration = Duration::from_millis(3000);

/// Package of the system UI process (status bar, shade, volume panel).
pub const SYSTEM_UI_PACKAGE: &str = "com.android.systemui";

/// Which precedence step produced a color decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSource {
    /// Color explicitly stored for the activity.
    Explicit,
    /// Home screen with transparency.
    Home,
    /// Auto color disabled, global manual color.
    Manual,
    /// System shell, forced to the manual color.
    SystemShell,
    /// Valid cached extraction.
    Cache,
    /// Fresh theme extraction.
    Extracted,
    /// Extraction found nothing, global manual color.
    Fallback,
}

/// Authoritative overlay appearance at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedState {
    /// Ignored by receivers while `is_transparent` is set.
    pub color: Color,
    pub is_transparent: bool,
    pub is_fullscreen: bool,
    pub is_system_fullscreen: bool,
    pub package_name: Option<String>,
    pub activity_name: Option<String>,
    pub source: ColorSource,
}

impl ResolvedState {
    pub fn opaque(identity: &AppIdentity, color: Color, is_fullscreen: bool, source: ColorSource) -> Self {
        Self {
            color,
            is_transparent: false,
            is_fullscreen,
            is_system_fullscreen: false,
            package_name: Some(identity.package_name.clone()),
            activity_name: identity.activity_name.clone(),
            source,
        }
    }

    pub fn transparent(identity: &AppIdentity, is_fullscreen: bool) -> Self {
        Self {
            color: Color::TRANSPARENT,
            is_transparent: true,
            is_fullscreen,
            is_system_fullscreen: false,
            package_name: Some(identity.package_name.clone()),
            activity_name: identity.activity_name.clone(),
            source: ColorSource::Home,
        }
    }

    pub fn to_update(&self) -> StateUpdate {
        StateUpdate::from(self)
    }
}

impl From<&ResolvedState> for StateUpdate {
    fn from(state: &ResolvedState) -> Self {
        Self {
            color: (!state.is_transparent).then_some(state.color),
            is_transparent: Some(state.is_transparent),
            is_fullscreen: Some(state.is_fullscreen),
            is_system_fullscreen: Some(state.is_system_fullscreen),
            package_name: state.package_name.clone(),
            activity_name: state.activity_name.clone(),
        }
    }
}

/// Static facts about the host the overlay runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    /// The overlay's own package. Never resolved, never tracked.
    pub host_package: String,

    pub system_ui_package: String,

    /// Color shown while the overlay's own UI is in front.
    pub self_color: Color,

    pub volume_debounce_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host_package: "dev.tintbar".to_string(),
            system_ui_package: SYSTEM_UI_PACKAGE.to_string(),
            self_color: Color::rgb(0x30, 0x3F, 0x9F),
            volume_debounce_ms: DEFAULT_VOLUME_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl HostConfig {
    pub fn volume_debounce(&self) -> Duration {
        Duration::from_millis(self.volume_debounce_ms)
    }

    pub fn is_host(&self, package_name: &str) -> bool {
        package_name == self.host_package
    }

    pub fn is_system_ui(&self, package_name: &str) -> bool {
        package_name == self.system_ui_package
    }
}

/// Raw event delivered by the platform's observation channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RawEvent {
    /// A window came to the front.
    #[serde(rename_all = "camelCase")]
    WindowStateChanged {
        package_name: String,
        #[serde(default)]
        class_name: String,
        /// Free-text description attached by the platform.
        #[serde(default)]
        text: String,
    },

    /// Notification observed through window events (compat path only).
    NotificationPosted { record: NotificationRecord },

    /// Synthetic "volume changed" broadcast.
    VolumeChanged,
}

/// Normalized foreground change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundChange {
    /// The overlay's own UI is in front: fixed self color, resolver bypassed.
    SelfForeground { color: Color },

    /// System volume panel appeared.
    VolumeShown,

    /// System volume panel went away.
    VolumeHidden,

    /// Some other transient system surface (shade, dialogs).
    SystemSurface,

    /// A regular app came to the front and needs resolving.
    App {
        identity: AppIdentity,
        version: i64,
        is_home: bool,
    },

    /// Metadata lookup failed; keep the last identity and settle.
    Fallback { last_known: Option<AppIdentity> },

    /// Notification seen on the compat path.
    CompatNotification(NotificationRecord),
}
