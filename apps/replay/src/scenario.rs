//! Scenario file format.

use serde::Deserialize;
use std::sync::Mutex;
use tintbar_color::Color;
use tintbar_context::platform::PlatformSnapshot;
use tintbar_context::{HostConfig, RawEvent, ThemeAttribute, ThemeId};
use tintbar_events::{Command, NotificationRecord};
use tintbar_notify::{NotificationPlatform, SourceError};
use tintbar_prefs::{AppIdentity, PreferenceKey, PreferenceValue};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub platform: PlatformSnapshot,
    #[serde(default)]
    pub preferences: Vec<PreferenceEntry>,
    /// Native listener state. Absent means the compat path is used.
    #[serde(default)]
    pub listener: Option<ListenerSnapshot>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceEntry {
    pub key: PreferenceKey,
    #[serde(default)]
    pub app: Option<AppIdentity>,
    pub value: PreferenceValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerSnapshot {
    /// Active notifications, newest first.
    #[serde(default)]
    pub active: Vec<NotificationRecord>,
    #[serde(default)]
    pub permission_denied: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeChange {
    pub theme: ThemeId,
    pub attribute: ThemeAttribute,
    pub color: Color,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    Event {
        event: RawEvent,
    },
    Command {
        command: Command,
    },
    ListenerConnected,
    ListenerDisconnected,
    ListenerPosted {
        record: NotificationRecord,
    },
    ListenerRemoved {
        key: String,
    },
    /// App reinstalled or updated: version bump plus an optional theme edit.
    #[serde(rename_all = "camelCase")]
    AppUpdated {
        package_name: String,
        #[serde(default)]
        theme: Option<ThemeChange>,
    },
    Wait {
        ms: u64,
    },
}

/// Listener backed by the scenario's active list.
pub struct ScenarioListener {
    active: Mutex<Vec<NotificationRecord>>,
    permission_denied: bool,
}

impl ScenarioListener {
    pub fn new(snapshot: ListenerSnapshot) -> Self {
        Self {
            active: Mutex::new(snapshot.active),
            permission_denied: snapshot.permission_denied,
        }
    }

    pub fn posted(&self, record: &NotificationRecord) {
        if let Ok(mut active) = self.active.lock() {
            active.retain(|r| r.key != record.key);
            active.insert(0, record.clone());
        }
    }

    pub fn removed(&self, key: &str) {
        if let Ok(mut active) = self.active.lock() {
            active.retain(|r| r.key != key);
        }
    }
}

impl NotificationPlatform for ScenarioListener {
    fn active_notifications(&self) -> Result<Vec<NotificationRecord>, SourceError> {
        if self.permission_denied {
            return Err(SourceError::PermissionDenied);
        }
        self.active
            .lock()
            .map(|active| active.clone())
            .map_err(|_| SourceError::Platform("listener state poisoned".to_string()))
    }

    fn cancel(&self, key: &str) -> Result<(), SourceError> {
        tracing::info!(key, "listener cancel");
        self.removed(key);
        Ok(())
    }
}
