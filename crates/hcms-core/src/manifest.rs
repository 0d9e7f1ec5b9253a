//! Remote manifest types.
//!
//! A remote publishes `assets/manifest.json` describing how to route to it.
//! Every field is optional on the wire; blanks are treated as missing.

use serde::{Deserialize, Serialize};

use crate::descriptor::{DescriptorOrigin, RemoteDescriptor};
use crate::naming;

/// Manifest published by a remote module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub remote_name: Option<String>,
    #[serde(default)]
    pub exposed_module: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub route_path: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl Manifest {
    /// Consumes the manifest into a descriptor for the remote `name` served from `base_url`.
    ///
    /// Present fields are copied verbatim, except the route path which is stored
    /// without surrounding slashes. Missing or blank fields (a route path of only
    /// slashes counts as blank) fall back to naming conventions. The entry URL
    /// always derives from `base_url`.
    pub fn into_descriptor(self, name: &str, base_url: &str) -> RemoteDescriptor {
        if let Some(remote_name) = present(&self.remote_name)
            && remote_name != name
        {
            tracing::debug!(
                remote = name,
                manifest_remote_name = remote_name,
                "Manifest remoteName differs from configured name; keeping configured key"
            );
        }

        let fallback = RemoteDescriptor::fallback(name, base_url);
        RemoteDescriptor {
            key: fallback.key,
            entry_url: fallback.entry_url,
            exposed_module: take_present(self.exposed_module).unwrap_or(fallback.exposed_module),
            display_name: take_present(self.display_name).unwrap_or(fallback.display_name),
            route_path: self
                .route_path
                .as_deref()
                .map(naming::normalize_route_path)
                .filter(|path| !path.is_empty())
                .map(str::to_string)
                .unwrap_or(fallback.route_path),
            version: take_present(self.version),
            origin: DescriptorOrigin::Manifest,
        }
    }

    /// True when the manifest carries none of the routing fields.
    pub fn is_empty(&self) -> bool {
        present(&self.exposed_module).is_none()
            && present(&self.display_name).is_none()
            && self
                .route_path
                .as_deref()
                .is_none_or(|p| naming::normalize_route_path(p).is_empty())
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn take_present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
