//! Notification reconciliation for tintbar.
//!
//! Notifications reach the overlay through one of two paths: the native
//! listener, or (when that is unavailable or disabled) a compat path that
//! infers them from window events. Both feed a single
//! [`NotificationTracker`], which owns the de-duplicated set and emits
//! add/remove events on the bus.
//!
//! - [`NotificationSet`]: ordered, key-unique storage
//! - [`NotificationTracker`]: filtering, heads-up suppression, emission
//! - [`NotificationSource`]: listener and compat implementations
//! - [`NotificationHub`]: path selection, connect/replay lifecycle

mod hub;
mod set;
mod source;
mod tracker;

pub use hub::NotificationHub;
pub use set::NotificationSet;
pub use source::{
    CompatSource, HeadsUpSuppressor, ListenerSource, NotificationPlatform, NotificationSource,
    NullSuppressor, Result, SourceError, SourceKind, SUPPRESSOR_ID,
};
pub use tracker::NotificationTracker;
