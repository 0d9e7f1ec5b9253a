//! Remote module descriptors.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::naming;

/// Where the values of a descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorOrigin {
    /// Built from a fetched manifest (missing fields filled by convention).
    Manifest,
    /// Built entirely from naming conventions because no manifest was available.
    Fallback,
    /// Supplied verbatim by the embedding application.
    #[default]
    Explicit,
}

impl std::fmt::Display for DescriptorOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manifest => write!(f, "manifest"),
            Self::Fallback => write!(f, "fallback"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

/// Connection descriptor for one remote module.
///
/// Identity is `key`. A descriptor is always complete enough to build a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDescriptor {
    /// Registry key (the remote's technical name).
    pub key: String,

    /// Federation entry point, e.g. `http://localhost:4201/remoteEntry.js`.
    pub entry_url: String,

    /// Module path exposed by the remote, e.g. `./Routes`.
    pub exposed_module: String,

    /// Human-readable name shown on the home view.
    pub display_name: String,

    /// Route path (first path segment) the remote is mounted under.
    pub route_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub origin: DescriptorOrigin,
}

impl RemoteDescriptor {
    /// Builds a descriptor purely from naming conventions.
    pub fn fallback(name: &str, base_url: &str) -> Self {
        Self {
            key: name.to_string(),
            entry_url: naming::entry_url_for(base_url),
            exposed_module: naming::DEFAULT_EXPOSED_MODULE.to_string(),
            display_name: naming::title_case(name),
            route_path: naming::default_route_path(name),
            version: None,
            origin: DescriptorOrigin::Fallback,
        }
    }

    /// Marks the descriptor as supplied by the embedding application.
    pub fn explicit(mut self) -> Self {
        self.origin = DescriptorOrigin::Explicit;
        self
    }

    /// Route path without surrounding slashes.
    pub fn normalized_route_path(&self) -> &str {
        naming::normalize_route_path(&self.route_path)
    }

    /// Checks that every field needed to build a route is present.
    pub fn validate(&self) -> Result<()> {
        if !naming::is_valid_remote_name(&self.key) {
            return Err(CoreError::invalid_descriptor(
                &self.key,
                "key must be a non-empty kebab-case name",
            ));
        }
        let blanks = [
            ("entryUrl", &self.entry_url),
            ("exposedModule", &self.exposed_module),
            ("displayName", &self.display_name),
        ];
        for (field, value) in blanks {
            if value.trim().is_empty() {
                return Err(CoreError::invalid_descriptor(
                    &self.key,
                    format!("{field} must not be empty"),
                ));
            }
        }
        if self.normalized_route_path().is_empty() {
            return Err(CoreError::invalid_descriptor(
                &self.key,
                "routePath must not be empty",
            ));
        }
        naming::validate_base_url(&self.entry_url)
            .map_err(|e| CoreError::invalid_descriptor(&self.key, e.to_string()))?;
        Ok(())
    }
}
