use std::sync::{Mutex, MutexGuard};
use tintbar_color::Color;
use tintbar_context::ResolvedState;
use tintbar_events::{emit_message, event_names, EventBusRef, StateUpdate};

#[derive(Debug, Default)]
struct LastState {
    /// Bumped for every foreground change; only the newest may publish.
    seq: u64,
    resolved: Option<ResolvedState>,
    color: Option<Color>,
    /// What the foreground shows once transient system UI goes away.
    settle: Option<StateUpdate>,
}

/// Sends state updates and remembers what was last shown.
///
/// Shared between the service and the volume timer's settle callback. Every
/// emission happens while holding the state lock, so the bus sees updates in
/// the same order the state changed.
pub(crate) struct StateEmitter {
    bus: EventBusRef,
    last: Mutex<LastState>,
}

impl StateEmitter {
    pub(crate) fn new(bus: EventBusRef) -> Self {
        Self {
            bus,
            last: Mutex::new(LastState::default()),
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, LastState>> {
        match self.last.lock() {
            Ok(last) => Some(last),
            Err(_) => {
                tracing::warn!("state emitter lock poisoned");
                None
            }
        }
    }

    fn emit(&self, update: &StateUpdate) {
        tracing::debug!(?update, "state update");
        emit_message(self.bus.as_ref(), event_names::STATE_UPDATE, update);
    }

    /// Start a new foreground resolution, superseding any in flight.
    pub(crate) fn begin(&self) -> u64 {
        match self.lock() {
            Some(mut last) => {
                last.seq += 1;
                last.seq
            }
            None => 0,
        }
    }

    /// Publish `state` if no resolution started after `seq`. Returns whether
    /// it was published.
    pub(crate) fn publish_if(&self, seq: u64, state: ResolvedState) -> bool {
        let Some(mut last) = self.lock() else {
            return false;
        };
        if last.seq != seq {
            return false;
        }

        let update = state.to_update();
        if !state.is_transparent {
            last.color = Some(state.color);
        }
        last.resolved = Some(state);
        last.settle = Some(update.clone());
        self.emit(&update);
        true
    }

    /// The overlay's own UI is in front.
    pub(crate) fn self_color(&self, color: Color) {
        let Some(mut last) = self.lock() else {
            return;
        };
        last.seq += 1;

        let update = StateUpdate {
            color: Some(color),
            is_transparent: Some(false),
            is_system_fullscreen: Some(false),
            ..Default::default()
        };
        last.color = Some(color);
        last.settle = Some(update.clone());
        self.emit(&update);
    }

    pub(crate) fn system_fullscreen(&self) {
        if let Some(_last) = self.lock() {
            self.emit(&StateUpdate::system_fullscreen());
        }
    }

    /// Drop any transient system state and show the foreground again.
    pub(crate) fn settle(&self) {
        if let Some(last) = self.lock() {
            let update = last.settle.clone().unwrap_or_else(StateUpdate::settled);
            self.emit(&update);
        }
    }

    /// Plain settle update without app details.
    pub(crate) fn fallback(&self) {
        let Some(mut last) = self.lock() else {
            return;
        };
        last.seq += 1;
        last.settle = Some(StateUpdate::settled());
        self.emit(&StateUpdate::settled());
    }

    /// Re-send the last color, if any was ever shown.
    pub(crate) fn resend_color(&self) -> bool {
        let Some(last) = self.lock() else {
            return false;
        };
        match last.color {
            Some(color) => {
                self.emit(&StateUpdate::color(color));
                true
            }
            None => false,
        }
    }

    pub(crate) fn last_resolved(&self) -> Option<ResolvedState> {
        self.lock().and_then(|last| last.resolved.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tintbar_context::ColorSource;
    use tintbar_events::InMemoryEventBus;
    use tintbar_prefs::AppIdentity;

    fn emitter() -> (StateEmitter, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        (StateEmitter::new(bus.clone()), bus)
    }

    fn mail(color: Color) -> ResolvedState {
        let identity = AppIdentity::activity("com.mail", "Inbox");
        ResolvedState::opaque(&identity, color, false, ColorSource::Extracted)
    }

    fn updates(bus: &InMemoryEventBus) -> Vec<StateUpdate> {
        bus.messages_for(event_names::STATE_UPDATE)
    }

    #[test]
    fn test_superseded_resolution_is_not_published() {
        let (emitter, bus) = emitter();
        let stale = emitter.begin();
        let current = emitter.begin();

        assert!(emitter.publish_if(current, mail(Color::rgb(2, 2, 2))));
        assert!(!emitter.publish_if(stale, mail(Color::rgb(1, 1, 1))));

        assert_eq!(updates(&bus).len(), 1);
        assert_eq!(emitter.last_resolved().map(|s| s.color), Some(Color::rgb(2, 2, 2)));
    }

    #[test]
    fn test_self_color_and_fallback_supersede_resolution() {
        let (emitter, bus) = emitter();

        let seq = emitter.begin();
        emitter.self_color(Color::rgb(9, 9, 9));
        assert!(!emitter.publish_if(seq, mail(Color::rgb(1, 1, 1))));

        let seq = emitter.begin();
        emitter.fallback();
        assert!(!emitter.publish_if(seq, mail(Color::rgb(1, 1, 1))));

        assert_eq!(updates(&bus).len(), 2);
    }

    #[test]
    fn test_settle_restores_whatever_is_in_front() {
        let (emitter, bus) = emitter();
        emitter.settle();
        assert_eq!(updates(&bus), vec![StateUpdate::settled()]);

        let seq = emitter.begin();
        emitter.publish_if(seq, mail(Color::rgb(1, 1, 1)));
        emitter.self_color(Color::rgb(9, 9, 9));
        bus.clear();

        emitter.settle();
        let settled = updates(&bus);
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].color, Some(Color::rgb(9, 9, 9)));
        assert_eq!(settled[0].package_name, None);

        emitter.fallback();
        bus.clear();
        emitter.settle();
        assert_eq!(updates(&bus), vec![StateUpdate::settled()]);
    }
}
