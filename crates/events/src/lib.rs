//! Shared message contracts for tintbar.
//!
//! This crate defines the DTOs that flow from the resolution engine to the
//! overlay renderer, and the commands the renderer sends back. Using shared
//! types keeps producer and consumer field names in lockstep.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{emit_message, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use serde::{Deserialize, Serialize};
use tintbar_color::Color;

/// Neutral priority used when a notification's live ranking is unknown.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Partial update of the overlay's visual state.
///
/// Every field is optional: receivers apply present fields and keep their
/// prior value for absent ones.
///
/// Producers: status service (resolver, volume debouncer)
/// Consumers: overlay renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_transparent: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fullscreen: Option<bool>,

    /// Set while a transient system surface (volume panel, shade) covers the
    /// screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_system_fullscreen: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    /// Activity class of the foreground app, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_name: Option<String>,
}

impl StateUpdate {
    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }

    /// Transient system surface on top: hide behind it.
    pub fn system_fullscreen() -> Self {
        Self {
            is_transparent: Some(false),
            is_system_fullscreen: Some(true),
            ..Default::default()
        }
    }

    /// Generic settle back to a non-transparent, non-system state.
    pub fn settled() -> Self {
        Self {
            is_transparent: Some(false),
            is_system_fullscreen: Some(false),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Accumulated view of the overlay, as a receiver of [`StateUpdate`]s sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayState {
    pub color: Color,
    pub is_transparent: bool,
    pub is_fullscreen: bool,
    pub is_system_fullscreen: bool,
    pub package_name: Option<String>,
    pub activity_name: Option<String>,
}

impl OverlayState {
    /// Apply the fields present in `update`.
    pub fn apply(&mut self, update: &StateUpdate) {
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(is_transparent) = update.is_transparent {
            self.is_transparent = is_transparent;
        }
        if let Some(is_fullscreen) = update.is_fullscreen {
            self.is_fullscreen = is_fullscreen;
        }
        if let Some(is_system_fullscreen) = update.is_system_fullscreen {
            self.is_system_fullscreen = is_system_fullscreen;
        }
        if let Some(ref package_name) = update.package_name {
            self.package_name = Some(package_name.clone());
        }
        if let Some(ref activity_name) = update.activity_name {
            self.activity_name = Some(activity_name.clone());
        }
    }
}

/// A notification as tracked by the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Unique key (native key, or derived from package/id/tag).
    pub key: String,

    pub package_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    pub id: i32,

    #[serde(default)]
    pub priority: i32,

    /// Post time in milliseconds since epoch.
    #[serde(default)]
    pub timestamp_ms: i64,

    /// Whether the poster asked for heads-up / full-screen presentation.
    #[serde(default)]
    pub heads_up: bool,
}

impl NotificationRecord {
    /// Create a record whose key is derived from package, id and tag.
    pub fn new(package_name: impl Into<String>, id: i32, tag: Option<String>) -> Self {
        let package_name = package_name.into();
        Self {
            key: Self::derive_key(&package_name, id, tag.as_deref()),
            package_name,
            tag,
            id,
            priority: DEFAULT_PRIORITY,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            heads_up: false,
        }
    }

    /// Key used when the platform does not supply one.
    pub fn derive_key(package_name: &str, id: i32, tag: Option<&str>) -> String {
        match tag {
            Some(tag) => format!("{package_name}/{id}/{tag}"),
            None => format!("{package_name}/{id}"),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_heads_up(mut self, heads_up: bool) -> Self {
        self.heads_up = heads_up;
        self
    }
}

/// Event emitted when a notification enters the tracked set.
///
/// Producers: notification tracker
/// Consumers: overlay notification icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAddedEvent {
    pub record: NotificationRecord,
}

/// Event emitted when a notification is removed.
///
/// Emitted even for keys that were never tracked, so the receiver stays in
/// sync with the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRemovedEvent {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<NotificationRecord>,
}

/// Commands the renderer sends to the status service.
///
/// Unknown command types deserialize to [`Command::Unknown`] and are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Replay the active notification list.
    GetNotifications,

    /// Dismiss a notification at its source.
    CancelNotification { key: String },

    /// Re-send the last resolved color.
    GetColor,

    #[serde(other)]
    Unknown,
}

impl Command {
    /// Parse a JSON command, mapping anything malformed to `Unknown`.
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or(Command::Unknown)
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Overlay visual state update.
    pub const STATE_UPDATE: &str = "overlay:state_update";
    /// Notification added to the tracked set.
    pub const NOTIFICATION_ADDED: &str = "notifications:added";
    /// Notification removed from the tracked set.
    pub const NOTIFICATION_REMOVED: &str = "notifications:removed";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_update_skips_absent_fields() {
        let update = StateUpdate::color(Color::BLACK);
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r##"{"color":"#FF000000"}"##);
    }

    #[test]
    fn test_overlay_state_applies_only_present_fields() {
        let mut state = OverlayState::default();
        state.apply(&StateUpdate {
            color: Some(Color::rgb(1, 2, 3)),
            package_name: Some("com.example".to_string()),
            is_fullscreen: Some(true),
            ..Default::default()
        });
        state.apply(&StateUpdate::system_fullscreen());

        assert_eq!(state.color, Color::rgb(1, 2, 3));
        assert!(state.is_fullscreen);
        assert!(state.is_system_fullscreen);
        assert_eq!(state.package_name.as_deref(), Some("com.example"));
    }

    #[test]
    fn test_derived_keys() {
        assert_eq!(NotificationRecord::derive_key("com.mail", 4, None), "com.mail/4");
        assert_eq!(
            NotificationRecord::derive_key("com.mail", 4, Some("inbox")),
            "com.mail/4/inbox"
        );
        let record = NotificationRecord::new("com.mail", 4, Some("inbox".to_string()));
        assert_eq!(record.key, "com.mail/4/inbox");
        assert_eq!(record.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(
            Command::from_json(r#"{"type": "getNotifications"}"#),
            Command::GetNotifications
        );
        assert_eq!(
            Command::from_json(r#"{"type": "cancelNotification", "key": "a/1"}"#),
            Command::CancelNotification {
                key: "a/1".to_string()
            }
        );
        assert_eq!(
            Command::from_json(r#"{"type": "somethingNew"}"#),
            Command::Unknown
        );
        assert_eq!(Command::from_json("not json"), Command::Unknown);
    }

    #[test]
    fn test_record_deserialize_minimal() {
        let json = r#"{"key": "k", "packageName": "com.chat", "id": 3}"#;
        let record: NotificationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.tag, None);
        assert!(!record.heads_up);
        assert_eq!(record.priority, 0);
    }
}
