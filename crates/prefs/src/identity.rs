//! Identity of a resolvable application unit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A package, optionally refined to one of its activities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppIdentity {
    /// Package name (e.g., "com.example.mail")
    pub package_name: String,

    /// Fully qualified activity class, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_name: Option<String>,
}

impl AppIdentity {
    pub fn package(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            activity_name: None,
        }
    }

    pub fn activity(package_name: impl Into<String>, activity_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            activity_name: Some(activity_name.into()),
        }
    }

    /// The package-level identity this one refines.
    pub fn package_identity(&self) -> AppIdentity {
        Self::package(self.package_name.clone())
    }

    pub fn is_activity(&self) -> bool {
        self.activity_name.is_some()
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.activity_name {
            Some(ref activity) => write!(f, "{}/{}", self.package_name, activity),
            None => f.write_str(&self.package_name),
        }
    }
}
