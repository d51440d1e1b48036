use crate::emitter::StateEmitter;
use crate::platform::ServicePlatform;
use std::sync::{Arc, Mutex};
use tintbar_context::{
    ColorResolver, ForegroundChange, ForegroundObserver, HostConfig, RawEvent, ResolvedState,
    Resolution, ResolverConfig, ThemeColorExtractor, VolumeTimer,
};
use tintbar_events::{Command, EventBusRef, NotificationRecord};
use tintbar_notify::{ListenerSource, NotificationHub, NotificationTracker};
use tintbar_prefs::{AppIdentity, PreferenceKey, PreferenceStoreRef};

/// The overlay's state-resolution engine.
///
/// Feed it raw events, listener callbacks and renderer commands; it emits
/// [`StateUpdate`](tintbar_events::StateUpdate) and notification messages on
/// the bus. Every method takes `&self` so the service can sit behind an `Arc`
/// and be driven from several event channels at once.
pub struct StatusService {
    host: HostConfig,
    prefs: PreferenceStoreRef,
    observer: Mutex<ForegroundObserver>,
    resolver: Arc<ColorResolver>,
    emitter: Arc<StateEmitter>,
    volume: VolumeTimer,
    hub: NotificationHub,
}

impl StatusService {
    pub fn new(
        host: HostConfig,
        prefs: PreferenceStoreRef,
        bus: EventBusRef,
        platform: ServicePlatform,
    ) -> Self {
        let emitter = Arc::new(StateEmitter::new(bus.clone()));

        let settle = Arc::clone(&emitter);
        let volume = VolumeTimer::new(host.volume_debounce(), Arc::new(move || settle.settle()));

        let resolver = ColorResolver::new(prefs.clone(), ThemeColorExtractor::new(platform.themes));
        let observer = ForegroundObserver::new(host.clone(), platform.packages, platform.home);

        let tracker = NotificationTracker::new(
            host.host_package.clone(),
            prefs.clone(),
            bus,
            platform.suppressor,
        );
        let listener = platform.notifications.map(ListenerSource::new);
        let hub = NotificationHub::new(tracker, listener, prefs.clone());

        tracing::info!(
            host = %host.host_package,
            debounce_ms = host.volume_debounce_ms,
            notification_path = ?hub.active_kind(),
            "status service created"
        );

        Self {
            host,
            prefs,
            observer: Mutex::new(observer),
            resolver: Arc::new(resolver),
            emitter,
            volume,
            hub,
        }
    }

    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    pub fn is_enabled(&self) -> bool {
        self.prefs.flag(PreferenceKey::StatusEnabled)
    }

    /// Most recent state published for a foreground app.
    pub fn last_resolved(&self) -> Option<ResolvedState> {
        self.emitter.last_resolved()
    }

    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.hub.tracker().snapshot()
    }

    pub fn is_volume_pending(&self) -> bool {
        self.volume.is_pending()
    }

    pub fn notification_hub(&self) -> &NotificationHub {
        &self.hub
    }

    /// Handle one raw window/notification/volume event.
    ///
    /// Resolves to completion, including any theme extraction, which runs on
    /// the blocking pool.
    pub async fn handle_event(&self, event: RawEvent) {
        if !self.is_enabled() {
            tracing::trace!("status disabled, event ignored");
            return;
        }

        let change = match self.observer.lock() {
            Ok(mut observer) => observer.on_event(event),
            Err(_) => {
                tracing::warn!("foreground observer lock poisoned");
                return;
            }
        };
        let Some(change) = change else {
            return;
        };

        match change {
            ForegroundChange::SelfForeground { color } => self.emitter.self_color(color),
            ForegroundChange::VolumeShown => {
                if !self.prefs.flag(PreferenceKey::HideOnVolume) {
                    return;
                }
                if self.volume.shown() {
                    self.emitter.system_fullscreen();
                }
            }
            ForegroundChange::VolumeHidden => {
                if self.volume.hidden() {
                    self.emitter.settle();
                }
            }
            ForegroundChange::SystemSurface => {
                self.emitter.system_fullscreen();
                let cleared = self.hub.on_system_surface();
                if cleared > 0 {
                    tracing::debug!(cleared, "compat notifications cleared");
                }
            }
            ForegroundChange::App {
                identity,
                version,
                is_home,
            } => self.resolve(identity, version, is_home).await,
            ForegroundChange::Fallback { last_known } => {
                tracing::debug!(last_known = ?last_known.map(|id| id.to_string()), "foreground fallback");
                self.emitter.fallback();
            }
            ForegroundChange::CompatNotification(record) => {
                self.hub.on_compat_posted(record);
            }
        }
    }

    /// Handle a command from the renderer.
    pub fn handle_command(&self, command: Command) {
        if !matches!(command, Command::GetColor) && !self.is_enabled() {
            tracing::trace!(?command, "status disabled, command ignored");
            return;
        }

        match command {
            Command::GetNotifications => self.hub.request_notifications(),
            Command::CancelNotification { key } => self.hub.cancel(&key),
            Command::GetColor => {
                if !self.emitter.resend_color() {
                    tracing::debug!("no color resolved yet");
                }
            }
            Command::Unknown => tracing::trace!("unknown command ignored"),
        }
    }

    pub fn on_listener_connected(&self) {
        self.hub.on_listener_connected();
    }

    pub fn on_listener_disconnected(&self) {
        self.hub.on_listener_disconnected();
    }

    pub fn on_listener_posted(&self, record: NotificationRecord) {
        if self.is_enabled() {
            self.hub.on_listener_posted(record);
        }
    }

    pub fn on_listener_removed(&self, key: &str) {
        if self.is_enabled() {
            self.hub.on_listener_removed(key);
        }
    }

    async fn resolve(&self, identity: AppIdentity, version: i64, is_home: bool) {
        let seq = self.emitter.begin();
        let config = ResolverConfig::capture(self.prefs.as_ref(), &self.host);

        let pending = match self.resolver.plan(&identity, version, is_home, &config) {
            Resolution::Resolved(state) => {
                if !self.emitter.publish_if(seq, state) {
                    tracing::debug!(identity = %identity, "superseded resolution discarded");
                }
                return;
            }
            Resolution::NeedsExtraction(pending) => pending,
        };

        let resolver = Arc::clone(&self.resolver);
        let job = pending.clone();
        let extracted = match tokio::task::spawn_blocking(move || resolver.extract(&job)).await {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!(identity = %identity, error = %e, "theme extraction task failed");
                None
            }
        };

        let state = self.resolver.complete(&pending, extracted);
        if !self.emitter.publish_if(seq, state) {
            tracing::debug!(identity = %identity, "superseded extraction discarded");
        }
    }
}
