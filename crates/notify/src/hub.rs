//! Selects the active delivery path and routes its events to the tracker.

use crate::source::{CompatSource, ListenerSource, NotificationSource, SourceError, SourceKind};
use crate::tracker::NotificationTracker;
use std::sync::Mutex;
use tintbar_events::NotificationRecord;
use tintbar_prefs::{PreferenceKey, PreferenceStoreRef};

#[derive(Debug, Default)]
struct ListenerState {
    connected: bool,
    replay_queued: bool,
}

/// Routes both delivery paths into one [`NotificationTracker`].
///
/// Exactly one path is active: the compat path when the compat preference is
/// set or no native listener exists, the listener otherwise. Events arriving
/// on the inactive path are dropped.
pub struct NotificationHub {
    tracker: NotificationTracker,
    listener: Option<ListenerSource>,
    compat: CompatSource,
    prefs: PreferenceStoreRef,
    state: Mutex<ListenerState>,
}

impl NotificationHub {
    pub fn new(
        tracker: NotificationTracker,
        listener: Option<ListenerSource>,
        prefs: PreferenceStoreRef,
    ) -> Self {
        Self {
            tracker,
            listener,
            compat: CompatSource::new(),
            prefs,
            state: Mutex::new(ListenerState::default()),
        }
    }

    pub fn tracker(&self) -> &NotificationTracker {
        &self.tracker
    }

    pub fn active_kind(&self) -> SourceKind {
        if self.listener.is_none() || self.prefs.flag(PreferenceKey::NotificationsCompat) {
            SourceKind::Compat
        } else {
            SourceKind::Listener
        }
    }

    fn active_source(&self) -> &dyn NotificationSource {
        match (self.active_kind(), &self.listener) {
            (SourceKind::Listener, Some(listener)) => listener as &dyn NotificationSource,
            _ => &self.compat as &dyn NotificationSource,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().map(|s| s.connected).unwrap_or(false)
    }

    /// Native listener bound. Runs a queued replay, once.
    pub fn on_listener_connected(&self) {
        let replay = match self.state.lock() {
            Ok(mut state) => {
                state.connected = true;
                std::mem::take(&mut state.replay_queued)
            }
            Err(_) => false,
        };
        tracing::info!(replay, "notification listener connected");

        if replay {
            self.replay();
        }
    }

    pub fn on_listener_disconnected(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.connected = false;
        }
        tracing::info!("notification listener disconnected");
    }

    pub fn on_listener_posted(&self, record: NotificationRecord) -> bool {
        if !self.accepts(SourceKind::Listener) {
            return false;
        }
        self.tracker.on_posted(record)
    }

    pub fn on_listener_removed(&self, key: &str) {
        if self.accepts(SourceKind::Listener) {
            self.tracker.on_removed(key);
        }
    }

    pub fn on_compat_posted(&self, record: NotificationRecord) -> bool {
        if !self.accepts(SourceKind::Compat) {
            return false;
        }
        if !self.tracker.is_allowed(&record.package_name) {
            return false;
        }
        self.compat.observe(record.clone());
        self.tracker.on_posted(record)
    }

    /// The notification shade was opened: the compat path forgets everything
    /// it has observed. Returns the number of removals emitted.
    pub fn on_system_surface(&self) -> usize {
        if self.active_kind() != SourceKind::Compat {
            return 0;
        }
        let observed = self.compat.take_all();
        for record in &observed {
            self.tracker.on_removed(&record.key);
        }
        observed.len()
    }

    /// Replay the active list now, or once the listener connects.
    pub fn request_notifications(&self) {
        if self.active_kind() == SourceKind::Listener {
            let queued = match self.state.lock() {
                Ok(mut state) if !state.connected => {
                    state.replay_queued = true;
                    true
                }
                _ => false,
            };
            if queued {
                tracing::debug!("listener not connected, replay queued");
                return;
            }
        }
        self.replay();
    }

    /// Dismiss a notification through the active source.
    pub fn cancel(&self, key: &str) {
        let source = self.active_source();
        if source.kind() == SourceKind::Listener && !self.is_connected() {
            tracing::debug!(key, "cancel ignored, listener not connected");
            return;
        }
        if let Err(e) = source.cancel(key) {
            tracing::warn!(key, error = %e, "failed to cancel notification");
        }
    }

    fn replay(&self) -> usize {
        let source = self.active_source();
        let active = match source.active_notifications() {
            Ok(active) => active,
            Err(SourceError::PermissionDenied) => {
                if self.prefs.flag(PreferenceKey::IgnorePermissionChecks) {
                    tracing::debug!("active notifications unavailable, permission denied");
                } else {
                    tracing::warn!("active notifications unavailable, permission denied");
                }
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(source = ?source.kind(), error = %e, "failed to read active notifications");
                return 0;
            }
        };
        self.tracker.reconcile_on_connect(active)
    }

    fn accepts(&self, kind: SourceKind) -> bool {
        let active = self.active_kind();
        if active != kind {
            tracing::trace!(?kind, ?active, "event from inactive notification path dropped");
            return false;
        }
        true
    }
}
