//! Event bus abstraction for decoupled event emission.
//!
//! The resolver and notification tracker never talk to the renderer
//! directly. They emit topic + JSON payload pairs through [`EventBus`], which
//! lets the core run headless (replay binary, tests) or behind any host
//! transport.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Trait for emitting events to subscribers.
pub trait EventBus: Send + Sync {
    /// Emit `payload` on `topic` (e.g. "overlay:state_update").
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `message` and emit it on `topic`.
///
/// A message that fails to serialize is logged and dropped; returns whether
/// anything was emitted.
pub fn emit_message<T: Serialize>(bus: &dyn EventBus, topic: &str, message: &T) -> bool {
    match serde_json::to_value(message) {
        Ok(payload) => {
            bus.emit(topic, payload);
            true
        }
        Err(e) => {
            tracing::warn!(topic, error = %e, "failed to serialize message, dropped");
            false
        }
    }
}

/// Bus that records every message, for tests and the replay harness.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

/// One recorded message.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while recording leaves a consistent Vec, so poisoning is ignored.
    fn recorded(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.recorded().clone()
    }

    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.recorded()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Decode every payload on `topic` into `T`, skipping ones that don't fit.
    pub fn messages_for<T: DeserializeOwned>(&self, topic: &str) -> Vec<T> {
        self.events_for(topic)
            .into_iter()
            .filter_map(|e| serde_json::from_value(e.payload).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.recorded().clear();
    }

    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.recorded().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// Discards everything.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_names, NotificationRemovedEvent, StateUpdate};
    use serde::ser::Error as _;
    use serde_json::json;

    #[test]
    fn test_messages_are_filtered_by_topic_and_decoded() {
        let bus = InMemoryEventBus::new();
        emit_message(&bus, event_names::STATE_UPDATE, &StateUpdate::settled());
        emit_message(
            &bus,
            event_names::NOTIFICATION_REMOVED,
            &NotificationRemovedEvent {
                key: "com.mail/1".to_string(),
                record: None,
            },
        );
        emit_message(&bus, event_names::STATE_UPDATE, &StateUpdate::system_fullscreen());

        assert_eq!(bus.len(), 3);
        assert_eq!(
            bus.messages_for::<StateUpdate>(event_names::STATE_UPDATE),
            vec![StateUpdate::settled(), StateUpdate::system_fullscreen()]
        );
        let removed: Vec<NotificationRemovedEvent> =
            bus.messages_for(event_names::NOTIFICATION_REMOVED);
        assert_eq!(removed[0].key, "com.mail/1");
        assert!(bus.events_for("overlay:unknown").is_empty());

        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_unserializable_message_is_dropped() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(S::Error::custom("not representable"))
            }
        }

        let bus = InMemoryEventBus::new();
        assert!(!emit_message(&bus, event_names::STATE_UPDATE, &Broken));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_null_event_bus() {
        NullEventBus.emit(event_names::STATE_UPDATE, json!({ "isTransparent": true }));
    }
}
