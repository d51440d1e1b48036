//! Normalizes raw window events into [`ForegroundChange`]s.

use crate::provider::{HomeResolver, PackageProvider};
use crate::state::{ForegroundChange, HostConfig, RawEvent};
use std::sync::Arc;
use tintbar_prefs::AppIdentity;

/// Tracks the foreground identity across raw events.
pub struct ForegroundObserver {
    host: HostConfig,
    packages: Arc<dyn PackageProvider>,
    home: Arc<dyn HomeResolver>,
    last_identity: Option<AppIdentity>,
}

impl ForegroundObserver {
    pub fn new(
        host: HostConfig,
        packages: Arc<dyn PackageProvider>,
        home: Arc<dyn HomeResolver>,
    ) -> Self {
        Self {
            host,
            packages,
            home,
            last_identity: None,
        }
    }

    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    /// Last app identity whose metadata resolved.
    pub fn last_identity(&self) -> Option<&AppIdentity> {
        self.last_identity.as_ref()
    }

    /// Classify one event. `None` means the event is ignored.
    pub fn on_event(&mut self, event: RawEvent) -> Option<ForegroundChange> {
        match event {
            RawEvent::VolumeChanged => Some(ForegroundChange::VolumeShown),
            RawEvent::NotificationPosted { record } => {
                if self.host.is_host(&record.package_name) {
                    return None;
                }
                Some(ForegroundChange::CompatNotification(record))
            }
            RawEvent::WindowStateChanged {
                package_name,
                class_name,
                text,
            } => self.on_window(package_name, class_name, &text),
        }
    }

    fn on_window(
        &mut self,
        package_name: String,
        class_name: String,
        text: &str,
    ) -> Option<ForegroundChange> {
        if package_name.is_empty() || class_name.is_empty() {
            return None;
        }

        if self.host.is_host(&package_name) {
            return Some(ForegroundChange::SelfForeground {
                color: self.host.self_color,
            });
        }

        if self.host.is_system_ui(&package_name) {
            let text = text.to_lowercase();
            let change = if !text.contains("volume") {
                ForegroundChange::SystemSurface
            } else if text.contains("hidden") {
                ForegroundChange::VolumeHidden
            } else {
                ForegroundChange::VolumeShown
            };
            tracing::trace!(?change, "system surface event");
            return Some(change);
        }

        match self.packages.activity_info(&package_name, &class_name) {
            Ok(info) => {
                let is_home = self
                    .home
                    .default_home_package()
                    .is_some_and(|home| home == info.identity.package_name);
                self.last_identity = Some(info.identity.clone());
                Some(ForegroundChange::App {
                    identity: info.identity,
                    version: info.version,
                    is_home,
                })
            }
            Err(e) => {
                tracing::debug!(
                    package = %package_name,
                    class = %class_name,
                    error = %e,
                    "metadata lookup failed"
                );
                Some(ForegroundChange::Fallback {
                    last_known: self.last_identity.clone(),
                })
            }
        }
    }
}
