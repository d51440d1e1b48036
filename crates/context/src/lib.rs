//! Foreground tracking and overlay color resolution for tintbar.
//!
//! Turns raw window events into the single overlay state the renderer should
//! show: which app is in front, what color its status bar area gets, and
//! whether the overlay is transparent or hidden for fullscreen.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                            │
//! │  state.rs    - ResolvedState, RawEvent, ForegroundChange    │
//! │  resolver.rs - Color precedence chain (pure)                │
//! │  volume.rs   - Volume overlay debounce state machine        │
//! │  provider.rs - Traits for package, home and theme lookups   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                       │
//! │  theme.rs    - Theme attribute extraction                   │
//! │  cache.rs    - Version-gated color cache                    │
//! │  platform/   - Snapshot-backed provider implementation      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                         │
//! │  observer.rs - Raw event normalization                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tintbar_context::{ColorResolver, ResolverConfig, ThemeColorExtractor};
//!
//! let resolver = ColorResolver::new(prefs.clone(), ThemeColorExtractor::new(platform));
//! let config = ResolverConfig::capture(prefs.as_ref(), &host);
//! let state = resolver.resolve(&identity, version, false, &config);
//! println!("{} from {:?}", state.color, state.source);
//! ```

mod cache;
mod observer;
mod provider;
mod resolver;
mod state;
mod theme;
mod volume;

pub mod platform;

pub use cache::ColorCache;
pub use observer::ForegroundObserver;
pub use provider::{
    ActivityInfo, ActivityTheme, HomeResolver, LookupError, NullProvider, PackageProvider,
    PackageThemes, ThemeAttribute, ThemeId, ThemeLookupError, ThemeSource,
};
pub use resolver::{ColorResolver, PendingExtraction, Resolution, ResolverConfig};
pub use state::{
    ColorSource, ForegroundChange, HostConfig, RawEvent, ResolvedState, DEFAULT_VOLUME_DEBOUNCE,
    SYSTEM_UI_PACKAGE,
};
pub use theme::ThemeColorExtractor;
pub use volume::{DebounceState, SettleCallback, VolumeOverlayDebouncer, VolumeTimer};
