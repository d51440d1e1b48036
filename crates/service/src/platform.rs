use std::sync::Arc;
use tintbar_context::platform::StaticPlatform;
use tintbar_context::{HomeResolver, PackageProvider, ThemeSource};
use tintbar_notify::{HeadsUpSuppressor, NotificationPlatform, NullSuppressor};

/// Platform capabilities the service is wired to.
#[derive(Clone)]
pub struct ServicePlatform {
    pub packages: Arc<dyn PackageProvider>,
    pub home: Arc<dyn HomeResolver>,
    pub themes: Arc<dyn ThemeSource>,
    /// Native notification listener, if the platform has one.
    pub notifications: Option<Arc<dyn NotificationPlatform>>,
    pub suppressor: Arc<dyn HeadsUpSuppressor>,
}

impl ServicePlatform {
    /// Package, home and theme lookups from one snapshot; no native listener.
    pub fn from_static(platform: Arc<StaticPlatform>) -> Self {
        Self {
            packages: platform.clone(),
            home: platform.clone(),
            themes: platform,
            notifications: None,
            suppressor: Arc::new(NullSuppressor),
        }
    }

    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationPlatform>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn with_suppressor(mut self, suppressor: Arc<dyn HeadsUpSuppressor>) -> Self {
        self.suppressor = suppressor;
        self
    }
}
