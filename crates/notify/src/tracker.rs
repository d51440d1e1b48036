//! Filtering and emission for the tracked notification set.

use crate::set::NotificationSet;
use crate::source::{HeadsUpSuppressor, SUPPRESSOR_ID};
use std::sync::{Arc, Mutex};
use tintbar_events::{
    emit_message, event_names, EventBusRef, NotificationAddedEvent, NotificationRecord,
    NotificationRemovedEvent, DEFAULT_PRIORITY,
};
use tintbar_prefs::{AppIdentity, PreferenceKey, PreferenceStoreRef};

/// Owns the [`NotificationSet`] and emits add/remove events for it.
///
/// Delivery-path agnostic: callers hand it normalized posted/removed calls.
pub struct NotificationTracker {
    host_package: String,
    prefs: PreferenceStoreRef,
    bus: EventBusRef,
    suppressor: Arc<dyn HeadsUpSuppressor>,
    set: Mutex<NotificationSet>,
}

impl NotificationTracker {
    pub fn new(
        host_package: impl Into<String>,
        prefs: PreferenceStoreRef,
        bus: EventBusRef,
        suppressor: Arc<dyn HeadsUpSuppressor>,
    ) -> Self {
        Self {
            host_package: host_package.into(),
            prefs,
            bus,
            suppressor,
            set: Mutex::new(NotificationSet::new()),
        }
    }

    /// Whether notifications from `package_name` may be shown.
    pub fn is_allowed(&self, package_name: &str) -> bool {
        if package_name == self.host_package {
            return false;
        }
        self.prefs
            .get_bool(
                PreferenceKey::Notifications,
                Some(&AppIdentity::package(package_name)),
            )
            .unwrap_or(true)
    }

    /// Track a newly posted notification. Returns whether it was accepted.
    pub fn on_posted(&self, record: NotificationRecord) -> bool {
        if !self.is_allowed(&record.package_name) {
            tracing::trace!(key = %record.key, "notification filtered");
            return false;
        }

        if record.heads_up {
            if record.id == SUPPRESSOR_ID {
                // Indistinguishable from our own placeholder. Dropping it is
                // long-standing behavior, not a deliberate filter.
                tracing::warn!(
                    key = %record.key,
                    id = record.id,
                    "heads-up notification collides with suppressor id, dropped"
                );
                return false;
            }
            if let Err(e) = self.suppressor.suppress() {
                tracing::warn!(key = %record.key, error = %e, "failed to suppress heads-up");
            }
        }

        let Ok(mut set) = self.set.lock() else {
            tracing::warn!("notification set lock poisoned");
            return false;
        };
        set.insert(record.clone());
        tracing::debug!(key = %record.key, package = %record.package_name, "notification added");
        emit_message(
            self.bus.as_ref(),
            event_names::NOTIFICATION_ADDED,
            &NotificationAddedEvent { record },
        );
        true
    }

    /// Stop tracking `key`. Emits a removal even for unknown keys.
    pub fn on_removed(&self, key: &str) -> Option<NotificationRecord> {
        let removed = match self.set.lock() {
            Ok(mut set) => set.remove(key),
            Err(_) => {
                tracing::warn!("notification set lock poisoned");
                None
            }
        };

        tracing::debug!(key, tracked = removed.is_some(), "notification removed");
        emit_message(
            self.bus.as_ref(),
            event_names::NOTIFICATION_REMOVED,
            &NotificationRemovedEvent {
                key: key.to_string(),
                record: removed.clone(),
            },
        );
        removed
    }

    /// Rebuild the set from the source's active list (newest first).
    ///
    /// The list is reversed so events go out oldest first, filtered like
    /// [`on_posted`](Self::on_posted), and every survivor gets
    /// [`DEFAULT_PRIORITY`] since live ranking is unavailable here. Returns
    /// the number of records emitted.
    pub fn reconcile_on_connect(&self, active: Vec<NotificationRecord>) -> usize {
        let survivors: Vec<NotificationRecord> = active
            .into_iter()
            .rev()
            .filter(|record| self.is_allowed(&record.package_name))
            .map(|record| record.with_priority(DEFAULT_PRIORITY))
            .collect();

        let Ok(mut set) = self.set.lock() else {
            tracing::warn!("notification set lock poisoned");
            return 0;
        };
        set.replace_all(survivors.iter().cloned());

        for record in &survivors {
            emit_message(
                self.bus.as_ref(),
                event_names::NOTIFICATION_ADDED,
                &NotificationAddedEvent {
                    record: record.clone(),
                },
            );
        }

        tracing::info!(count = survivors.len(), "notifications reconciled");
        survivors.len()
    }

    /// Tracked records in display order.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.set
            .lock()
            .map(|set| set.records().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.set.lock().map(|set| set.contains(key)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{NullSuppressor, Result as SourceResult, SourceError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tintbar_events::InMemoryEventBus;
    use tintbar_prefs::InMemoryPreferenceStore;

    const HOST: &str = "dev.tintbar";

    #[derive(Default)]
    struct CountingSuppressor {
        calls: AtomicUsize,
    }

    impl HeadsUpSuppressor for CountingSuppressor {
        fn suppress(&self) -> SourceResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSuppressor;

    impl HeadsUpSuppressor for FailingSuppressor {
        fn suppress(&self) -> SourceResult<()> {
            Err(SourceError::Platform("notify failed".to_string()))
        }
    }

    fn tracker_with(
        prefs: InMemoryPreferenceStore,
        suppressor: Arc<dyn HeadsUpSuppressor>,
    ) -> (NotificationTracker, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let tracker = NotificationTracker::new(HOST, Arc::new(prefs), bus.clone(), suppressor);
        (tracker, bus)
    }

    fn tracker() -> (NotificationTracker, Arc<InMemoryEventBus>) {
        tracker_with(InMemoryPreferenceStore::new(), Arc::new(CountingSuppressor::default()))
    }

    fn added_keys(bus: &InMemoryEventBus) -> Vec<String> {
        bus.messages_for::<NotificationAddedEvent>(event_names::NOTIFICATION_ADDED)
            .into_iter()
            .map(|e| e.record.key)
            .collect()
    }

    #[test]
    fn test_posted_is_tracked_and_emitted() {
        let (tracker, bus) = tracker();
        assert!(tracker.on_posted(NotificationRecord::new("com.chat", 7, Some("dm".into()))));
        assert!(tracker.contains("com.chat/7/dm"));
        assert_eq!(added_keys(&bus), vec!["com.chat/7/dm"]);
    }

    #[test]
    fn test_host_package_is_rejected() {
        let (tracker, bus) = tracker();
        assert!(!tracker.on_posted(NotificationRecord::new(HOST, 1, None)));
        assert!(bus.is_empty());
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn test_per_app_opt_out() {
        let prefs = InMemoryPreferenceStore::new().with(
            PreferenceKey::Notifications,
            Some(&AppIdentity::package("com.noisy")),
            false,
        );
        let (tracker, bus) = tracker_with(prefs, Arc::new(NullSuppressor));

        assert!(!tracker.on_posted(NotificationRecord::new("com.noisy", 1, None)));
        assert!(tracker.on_posted(NotificationRecord::new("com.quiet", 1, None)));
        assert_eq!(added_keys(&bus), vec!["com.quiet/1"]);
    }

    #[test]
    fn test_heads_up_triggers_suppressor() {
        let suppressor = Arc::new(CountingSuppressor::default());
        let (tracker, _bus) = tracker_with(InMemoryPreferenceStore::new(), suppressor.clone());

        tracker.on_posted(NotificationRecord::new("com.chat", 1, None));
        tracker.on_posted(NotificationRecord::new("com.call", 2, None).with_heads_up(true));
        assert_eq!(suppressor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_heads_up_with_suppressor_id_is_dropped() {
        let suppressor = Arc::new(CountingSuppressor::default());
        let (tracker, bus) = tracker_with(InMemoryPreferenceStore::new(), suppressor.clone());

        let record = NotificationRecord::new("com.call", SUPPRESSOR_ID, None).with_heads_up(true);
        assert!(!tracker.on_posted(record));
        assert!(bus.is_empty());
        assert_eq!(suppressor.calls.load(Ordering::SeqCst), 0);

        // Without heads-up the id is unremarkable.
        assert!(tracker.on_posted(NotificationRecord::new("com.call", SUPPRESSOR_ID, None)));
    }

    #[test]
    fn test_suppressor_failure_still_tracks() {
        let (tracker, bus) = tracker_with(InMemoryPreferenceStore::new(), Arc::new(FailingSuppressor));
        assert!(tracker.on_posted(NotificationRecord::new("com.call", 1, None).with_heads_up(true)));
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_double_remove_emits_twice() {
        let (tracker, bus) = tracker();
        tracker.on_posted(NotificationRecord::new("com.chat", 1, None));

        assert!(tracker.on_removed("com.chat/1").is_some());
        assert!(tracker.on_removed("com.chat/1").is_none());

        let removed = bus.messages_for::<NotificationRemovedEvent>(event_names::NOTIFICATION_REMOVED);
        assert_eq!(removed.len(), 2);
        assert!(removed[0].record.is_some());
        assert_eq!(removed[1].key, "com.chat/1");
        assert!(removed[1].record.is_none());
    }

    #[test]
    fn test_reconcile_reverses_filters_and_neutralizes_priority() {
        let (tracker, bus) = tracker();
        let a = NotificationRecord::new("com.a", 1, None).with_priority(2);
        let b = NotificationRecord::new("com.b", 1, None).with_priority(-1);
        let c = NotificationRecord::new(HOST, 1, None);

        // Platform order is newest first.
        let emitted = tracker.reconcile_on_connect(vec![c, b, a]);

        assert_eq!(emitted, 2);
        assert_eq!(added_keys(&bus), vec!["com.a/1", "com.b/1"]);
        assert!(tracker
            .snapshot()
            .iter()
            .all(|r| r.priority == DEFAULT_PRIORITY));
    }

    #[test]
    fn test_reconcile_replaces_stale_entries() {
        let (tracker, _bus) = tracker();
        tracker.on_posted(NotificationRecord::new("com.stale", 1, None));
        tracker.reconcile_on_connect(vec![NotificationRecord::new("com.fresh", 1, None)]);

        let keys: Vec<_> = tracker.snapshot().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["com.fresh/1"]);
    }
}
