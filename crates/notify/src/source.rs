//! Notification delivery paths.
//!
//! Both paths implement [`NotificationSource`] so the hub and tracker never
//! branch on where a notification came from.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tintbar_events::NotificationRecord;

/// Which delivery path a source represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Native notification listener.
    Listener,
    /// Notifications inferred from window events.
    Compat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("permission to read active notifications was denied")]
    PermissionDenied,

    #[error("notification listener is not connected")]
    Disconnected,

    #[error("{0:?} source does not support this operation")]
    Unsupported(SourceKind),

    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// A path notifications are delivered through.
pub trait NotificationSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Currently active notifications, newest first.
    fn active_notifications(&self) -> Result<Vec<NotificationRecord>>;

    /// Dismiss a notification at its origin.
    fn cancel(&self, key: &str) -> Result<()>;
}

/// Native notification listener capability.
pub trait NotificationPlatform: Send + Sync {
    /// Active notifications, newest first.
    fn active_notifications(&self) -> Result<Vec<NotificationRecord>>;

    fn cancel(&self, key: &str) -> Result<()>;
}

/// Reserved id of the placeholder posted to suppress the system's own
/// heads-up presentation.
pub const SUPPRESSOR_ID: i32 = 254231;

/// Posts and immediately cancels a blank full-screen notification so the
/// system does not show its own heads-up alert.
pub trait HeadsUpSuppressor: Send + Sync {
    fn suppress(&self) -> Result<()>;
}

/// Suppressor that does nothing.
pub struct NullSuppressor;

impl HeadsUpSuppressor for NullSuppressor {
    fn suppress(&self) -> Result<()> {
        Ok(())
    }
}

/// The native listener path.
pub struct ListenerSource {
    platform: Arc<dyn NotificationPlatform>,
}

impl ListenerSource {
    pub fn new(platform: Arc<dyn NotificationPlatform>) -> Self {
        Self { platform }
    }
}

impl NotificationSource for ListenerSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Listener
    }

    fn active_notifications(&self) -> Result<Vec<NotificationRecord>> {
        self.platform.active_notifications()
    }

    fn cancel(&self, key: &str) -> Result<()> {
        self.platform.cancel(key)
    }
}

/// The compat path.
///
/// Window events only ever report notifications being posted, so the source
/// remembers what it has seen until the notification shade is opened (the
/// user has looked at them) and the list is cleared.
#[derive(Default)]
pub struct CompatSource {
    observed: Mutex<Vec<NotificationRecord>>,
}

impl CompatSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, record: NotificationRecord) {
        if let Ok(mut observed) = self.observed.lock() {
            observed.retain(|r| r.key != record.key);
            observed.push(record);
        }
    }

    /// Forget everything observed, returning it oldest first.
    pub fn take_all(&self) -> Vec<NotificationRecord> {
        self.observed
            .lock()
            .map(|mut observed| std::mem::take(&mut *observed))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.observed.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSource for CompatSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Compat
    }

    fn active_notifications(&self) -> Result<Vec<NotificationRecord>> {
        let observed = self
            .observed
            .lock()
            .map_err(|_| SourceError::Platform("compat list lock poisoned".to_string()))?;
        Ok(observed.iter().rev().cloned().collect())
    }

    fn cancel(&self, _key: &str) -> Result<()> {
        Err(SourceError::Unsupported(SourceKind::Compat))
    }
}
