//! Volume overlay debounce.
//!
//! While the system volume panel is up the overlay shows a transient
//! system-fullscreen state. Every further volume signal restarts the window;
//! the normal state comes back only once the window elapses after the last
//! signal, or immediately when the panel reports itself hidden.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Debounce phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending,
}

/// Pure debounce state machine.
///
/// Every transition bumps a generation counter. A timer carries the
/// generation it was armed with and only settles the machine if nothing has
/// happened since, so a timer that fires after being superseded or cancelled
/// is a no-op.
#[derive(Debug, Default)]
pub struct VolumeOverlayDebouncer {
    generation: u64,
    pending: bool,
}

impl VolumeOverlayDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DebounceState {
        if self.pending {
            DebounceState::Pending
        } else {
            DebounceState::Idle
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Enter (or stay in) pending. Returns the generation the new timer must
    /// carry.
    pub fn on_volume_shown(&mut self) -> u64 {
        self.generation += 1;
        self.pending = true;
        self.generation
    }

    /// Back to idle without waiting. Returns whether a debounce was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.pending;
        self.pending = false;
        self.generation += 1;
        was_pending
    }

    /// Timer for `generation` elapsed. Returns whether this settled the
    /// machine.
    pub fn on_timer_fired(&mut self, generation: u64) -> bool {
        if !self.pending || generation != self.generation {
            return false;
        }
        self.pending = false;
        true
    }
}

/// Callback invoked when the debounce window elapses.
pub type SettleCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Debouncer plus the token of the one timer armed for its current
/// generation. Kept under a single lock so a generation and its timer are
/// always swapped together.
#[derive(Default)]
struct TimerSlot {
    debouncer: VolumeOverlayDebouncer,
    cancel: Option<CancellationToken>,
}

impl TimerSlot {
    fn replace_token(&mut self, token: Option<CancellationToken>) {
        if let Some(previous) = std::mem::replace(&mut self.cancel, token) {
            previous.cancel();
        }
    }
}

/// Drives a [`VolumeOverlayDebouncer`] with tokio timers.
///
/// At most one timer task is live: arming a new one cancels the previous
/// task's token.
pub struct VolumeTimer {
    slot: Arc<Mutex<TimerSlot>>,
    window: Duration,
    on_settle: SettleCallback,
}

impl VolumeTimer {
    pub fn new(window: Duration, on_settle: SettleCallback) -> Self {
        Self {
            slot: Arc::new(Mutex::new(TimerSlot::default())),
            window,
            on_settle,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.debouncer.state() == DebounceState::Pending)
            .unwrap_or(false)
    }

    /// Volume panel shown: (re)arm the timer for a full window.
    ///
    /// Returns `true` when this entered pending from idle.
    pub fn shown(&self) -> bool {
        let token = CancellationToken::new();
        let (entered, generation) = {
            let Ok(mut slot) = self.slot.lock() else {
                tracing::warn!("volume debouncer lock poisoned");
                return false;
            };
            let entered = slot.debouncer.state() == DebounceState::Idle;
            let generation = slot.debouncer.on_volume_shown();
            slot.replace_token(Some(token.clone()));
            (entered, generation)
        };

        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("no tokio runtime, volume debounce will not settle on its own");
            return entered;
        };

        let deadline = tokio::time::Instant::now() + self.window;
        let slot = Arc::clone(&self.slot);
        let on_settle = Arc::clone(&self.on_settle);
        handle.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    let settled = slot
                        .lock()
                        .map(|mut slot| {
                            let settled = slot.debouncer.on_timer_fired(generation);
                            if settled {
                                slot.cancel = None;
                            }
                            settled
                        })
                        .unwrap_or(false);
                    if settled {
                        tracing::debug!(generation, "volume debounce elapsed");
                        on_settle();
                    }
                }
            }
        });

        tracing::trace!(generation, entered, "volume debounce armed");
        entered
    }

    /// Volume panel hidden or explicit cancel. Returns whether a debounce
    /// was pending.
    pub fn hidden(&self) -> bool {
        self.slot
            .lock()
            .map(|mut slot| {
                let was_pending = slot.debouncer.cancel();
                slot.replace_token(None);
                was_pending
            })
            .unwrap_or(false)
    }
}

impl Drop for VolumeTimer {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.replace_token(None);
        }
    }
}
