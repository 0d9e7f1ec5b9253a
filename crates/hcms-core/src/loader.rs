//! Module loading capability.
//!
//! Loading a remote fragment is supplied by the hosting environment. The shell
//! only ever talks to it through [`ModuleLoader`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::descriptor::RemoteDescriptor;

/// Name of the route table a `./Routes` style module exposes.
pub const ROUTES_EXPORT: &str = "routes";

/// Name of the component a `./Module` style module exposes.
pub const COMPONENT_EXPORT: &str = "RemoteEntryComponent";

/// What to load: an entry URL plus the module path exposed under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub entry_url: String,
    pub exposed_module: String,
}

impl LoadRequest {
    pub fn new(entry_url: impl Into<String>, exposed_module: impl Into<String>) -> Self {
        Self {
            entry_url: entry_url.into(),
            exposed_module: exposed_module.into(),
        }
    }

    /// The named export a module at this path is expected to provide.
    pub fn expected_export(&self) -> UnitExport {
        let module = self.exposed_module.trim_start_matches("./");
        if module.eq_ignore_ascii_case("routes") {
            UnitExport::Routes {
                name: ROUTES_EXPORT.to_string(),
            }
        } else {
            UnitExport::Component {
                name: COMPONENT_EXPORT.to_string(),
            }
        }
    }
}

impl From<&RemoteDescriptor> for LoadRequest {
    fn from(descriptor: &RemoteDescriptor) -> Self {
        Self::new(&descriptor.entry_url, &descriptor.exposed_module)
    }
}

/// The named export of a loaded unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UnitExport {
    /// A child route table to mount under the remote's route path.
    Routes { name: String },
    /// A component to mount into a view slot.
    Component { name: String },
}

impl UnitExport {
    pub fn name(&self) -> &str {
        match self {
            Self::Routes { name } | Self::Component { name } => name,
        }
    }
}

/// A unit returned by a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedUnit {
    pub entry_url: String,
    pub exposed_module: String,
    pub export: UnitExport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
}

/// Errors that can occur while loading a remote module.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// The remote entry could not be reached.
    #[error("Remote entry unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// The remote entry returned a non-success status code.
    #[error("Remote entry {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    /// The remote entry responded without any content.
    #[error("Remote entry {0} is empty")]
    EmptyEntry(String),

    /// The loader cannot handle this request.
    #[error("Unsupported module {exposed_module} at {url}")]
    Unsupported { url: String, exposed_module: String },
}

/// Loads remote modules on demand.
///
/// Implementations must be thread-safe; a single loader is shared by every
/// navigation and dashboard request.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Loads the module exposed at `request.exposed_module` from `request.entry_url`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the unit cannot be loaded. Callers surface the
    /// failure to whoever triggered the load; nothing is retried.
    async fn load_module(&self, request: &LoadRequest) -> Result<LoadedUnit, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticLoader;

    #[async_trait]
    impl ModuleLoader for StaticLoader {
        async fn load_module(&self, request: &LoadRequest) -> Result<LoadedUnit, LoadError> {
            if request.entry_url.contains("offline") {
                return Err(LoadError::Unreachable {
                    url: request.entry_url.clone(),
                    message: "connection refused".into(),
                });
            }
            Ok(LoadedUnit {
                entry_url: request.entry_url.clone(),
                exposed_module: request.exposed_module.clone(),
                export: request.expected_export(),
                content_type: None,
                size_bytes: 0,
            })
        }
    }

    #[test]
    fn expected_export_by_exposed_path() {
        let routes = LoadRequest::new("http://localhost:4201/remoteEntry.js", "./Routes");
        assert_eq!(
            routes.expected_export(),
            UnitExport::Routes {
                name: "routes".into()
            }
        );

        let module = LoadRequest::new("http://localhost:4201/remoteEntry.js", "./Module");
        assert_eq!(module.expected_export().name(), "RemoteEntryComponent");
    }

    #[test]
    fn request_from_descriptor() {
        let d = RemoteDescriptor::fallback("demographics", "http://localhost:4203");
        let req = LoadRequest::from(&d);
        assert_eq!(req.entry_url, "http://localhost:4203/remoteEntry.js");
        assert_eq!(req.exposed_module, "./Routes");
    }

    #[test]
    fn loader_trait_object_is_usable() {
        let loader: Box<dyn ModuleLoader> = Box::new(StaticLoader);

        let ok = tokio_test::block_on(loader.load_module(&LoadRequest::new(
            "http://localhost:4202/remoteEntry.js",
            "./Routes",
        )))
        .unwrap();
        assert_eq!(ok.export.name(), "routes");

        let err = tokio_test::block_on(loader.load_module(&LoadRequest::new(
            "http://offline:1/remoteEntry.js",
            "./Routes",
        )))
        .unwrap_err();
        assert!(matches!(err, LoadError::Unreachable { .. }));
    }
}
