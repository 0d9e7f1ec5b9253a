//! Route Builder and active router.
//!
//! Routes are always rebuilt from a full registry snapshot; the active table is
//! replaced wholesale, never patched.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tracing::{debug, info, warn};

use hcms_core::{LoadError, LoadRequest, LoadedUnit, ModuleLoader, RemoteDescriptor};

/// Path of the static home route.
pub const HOME_ROUTE_PATH: &str = "";

/// What a route renders when navigated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RouteTarget {
    /// The shell's own home view.
    Home,
    /// A lazily loaded remote module.
    #[serde(rename_all = "camelCase")]
    Remote {
        key: String,
        entry_url: String,
        exposed_module: String,
    },
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalRoute {
    pub path: String,
    pub title: String,
    pub target: RouteTarget,
}

impl PortalRoute {
    pub fn home() -> Self {
        Self {
            path: HOME_ROUTE_PATH.to_string(),
            title: "Home".to_string(),
            target: RouteTarget::Home,
        }
    }

    pub fn for_remote(descriptor: &RemoteDescriptor) -> Self {
        Self {
            path: descriptor.normalized_route_path().to_string(),
            title: descriptor.display_name.clone(),
            target: RouteTarget::Remote {
                key: descriptor.key.clone(),
                entry_url: descriptor.entry_url.clone(),
                exposed_module: descriptor.exposed_module.clone(),
            },
        }
    }

    pub fn remote_key(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::Home => None,
            RouteTarget::Remote { key, .. } => Some(key),
        }
    }

    /// Activates the route.
    ///
    /// The home route needs no loading and yields `None`. A remote route
    /// delegates to `loader`; a failure is logged and handed back to the caller.
    pub async fn load(&self, loader: &dyn ModuleLoader) -> Result<Option<LoadedUnit>, LoadError> {
        let RouteTarget::Remote {
            key,
            entry_url,
            exposed_module,
        } = &self.target
        else {
            return Ok(None);
        };

        let request = LoadRequest::new(entry_url, exposed_module);
        match loader.load_module(&request).await {
            Ok(unit) => {
                debug!(remote = %key, path = %self.path, "Remote module loaded");
                Ok(Some(unit))
            }
            Err(e) => {
                warn!(remote = %key, path = %self.path, error = %e, "Failed to load remote module");
                Err(e)
            }
        }
    }
}

/// Ordered route list: the home route followed by one route per remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct RouteTable {
    routes: Vec<PortalRoute>,
}

impl RouteTable {
    pub fn routes(&self) -> &[PortalRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.path.as_str()).collect()
    }

    /// Finds the route whose path is a segment-wise prefix of the request path.
    ///
    /// `/` and the empty path resolve to the home route, which matches nothing
    /// else. The longest matching route path wins; when two remotes share a
    /// route path the first one wins.
    pub fn resolve(&self, path: &str) -> Option<&PortalRoute> {
        let requested: Vec<&str> = segments(path).collect();
        let mut best: Option<(&PortalRoute, usize)> = None;
        for route in &self.routes {
            let route_segments: Vec<&str> = segments(&route.path).collect();
            let matches = if route_segments.is_empty() {
                requested.is_empty()
            } else {
                requested.starts_with(&route_segments)
            };
            if matches && best.is_none_or(|(_, len)| route_segments.len() > len) {
                best = Some((route, route_segments.len()));
            }
        }
        best.map(|(route, _)| route)
    }

    pub fn find_by_key(&self, key: &str) -> Option<&PortalRoute> {
        self.routes.iter().find(|r| r.remote_key() == Some(key))
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Builds the complete route table from a registry snapshot.
///
/// Pure and idempotent: the same snapshot always yields an equal table.
pub fn build_routes(snapshot: &[RemoteDescriptor]) -> RouteTable {
    let mut routes = Vec::with_capacity(snapshot.len() + 1);
    routes.push(PortalRoute::home());
    routes.extend(snapshot.iter().map(PortalRoute::for_remote));
    RouteTable { routes }
}

/// Holds the active route table behind an atomic pointer swap.
///
/// Readers get a consistent snapshot without blocking; `reset_config` replaces
/// the table in one store.
#[derive(Clone)]
pub struct PortalRouter {
    table: Arc<ArcSwap<RouteTable>>,
}

impl PortalRouter {
    /// Creates a router serving only the home route.
    pub fn new() -> Self {
        Self {
            table: Arc::new(ArcSwap::from_pointee(build_routes(&[]))),
        }
    }

    /// Current route table snapshot.
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Replaces the whole route table.
    pub fn reset_config(&self, table: RouteTable) {
        info!(routes = table.len(), paths = ?table.paths(), "Router configuration updated");
        self.table.store(Arc::new(table));
    }

    /// Resolves `path` and activates the matching route.
    pub async fn navigate(
        &self,
        path: &str,
        loader: &dyn ModuleLoader,
    ) -> Result<Navigation, NavigationError> {
        let table = self.table();
        let route = table
            .resolve(path)
            .cloned()
            .ok_or_else(|| NavigationError::NoRoute(path.to_string()))?;

        let unit = route
            .load(loader)
            .await
            .map_err(|source| NavigationError::LoadFailed {
                path: route.path.clone(),
                source,
            })?;

        Ok(Navigation { route, unit })
    }
}

impl Default for PortalRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// A successful navigation.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub route: PortalRoute,
    /// Loaded unit; `None` for the home route.
    pub unit: Option<LoadedUnit>,
}

/// Why a navigation did not complete.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("No route matches '{0}'")]
    NoRoute(String),

    #[error("Route '{path}' failed to load: {source}")]
    LoadFailed {
        path: String,
        #[source]
        source: LoadError,
    },
}
