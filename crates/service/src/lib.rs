//! Status service for tintbar.
//!
//! Wires the foreground observer, color resolver, volume debounce and
//! notification hub into one [`StatusService`] that turns platform events
//! into overlay messages on an [`EventBus`](tintbar_events::EventBus).
//!
//! ```text
//! RawEvent ─► ForegroundObserver ─┬─► ColorResolver ──────► overlay:state_update
//!                                 ├─► VolumeTimer ────────► overlay:state_update
//!                                 └─► NotificationHub ────► notifications:*
//! listener callbacks / Command ─────► NotificationHub
//! ```

mod emitter;
mod platform;
mod service;

pub use platform::ServicePlatform;
pub use service::StatusService;
