//! Portal shell: owns the registry, the initializer and the active router.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{info, instrument};

use hcms_core::{LoadRequest, LoadedUnit, ModuleLoader, RemoteDescriptor};
use hcms_federation::{
    FetcherConfig, HttpModuleLoader, InitReport, KnownRemote, ManifestFetcher, Navigation,
    PortalRouter, RegistryInitializer, RemoteRegistry, RouteTable, build_routes,
};

use crate::config::AppConfig;
use crate::error::ShellError;

pub struct PortalShell {
    initializer: Arc<RegistryInitializer>,
    router: PortalRouter,
    loader: Arc<dyn ModuleLoader>,
    ready: AtomicBool,
    /// Keeps snapshot-and-swap atomic so a stale table never replaces a newer one.
    rebuild: Mutex<()>,
}

impl PortalShell {
    pub fn new(initializer: RegistryInitializer, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            initializer: Arc::new(initializer),
            router: PortalRouter::new(),
            loader,
            ready: AtomicBool::new(false),
            rebuild: Mutex::new(()),
        }
    }

    /// Wires the shell from configuration using the HTTP module loader.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ShellError> {
        let fetcher = ManifestFetcher::new(
            FetcherConfig::new()
                .with_request_timeout(cfg.fetch_timeout())
                .with_max_response_size(cfg.registry.max_manifest_bytes),
        )
        .map_err(|e| ShellError::configuration(e.to_string()))?;

        let initializer = RegistryInitializer::new(
            Arc::new(RemoteRegistry::new()),
            fetcher,
            cfg.registry.remotes.clone(),
        )
        .with_overlay(cfg.registry.overlay);

        let loader = HttpModuleLoader::new(cfg.loader_timeout())
            .map_err(|e| ShellError::configuration(e.to_string()))?;

        Ok(Self::new(initializer, Arc::new(loader)))
    }

    pub fn registry(&self) -> &Arc<RemoteRegistry> {
        self.initializer.registry()
    }

    pub fn router(&self) -> &PortalRouter {
        &self.router
    }

    pub fn loader(&self) -> &dyn ModuleLoader {
        self.loader.as_ref()
    }

    pub fn last_report(&self) -> Option<Arc<InitReport>> {
        self.initializer.last_report()
    }

    /// True once the first route table built from the registry is installed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Initializes the registry and installs the routes built from it.
    pub async fn start(&self) -> Arc<InitReport> {
        let report = self.initializer.initialize().await;
        self.rebuild_routes();
        self.ready.store(true, Ordering::Release);
        report
    }

    /// Re-runs initialization (joining one in flight) and rebuilds routes.
    pub async fn refresh(&self) -> Arc<InitReport> {
        self.start().await
    }

    /// Rebuilds the route table from the current registry snapshot.
    pub fn rebuild_routes(&self) -> Arc<RouteTable> {
        let _guard = self.rebuild.lock();
        let table = build_routes(&self.registry().list());
        self.router.reset_config(table);
        self.router.table()
    }

    /// Registers a descriptor verbatim under `key` and rebuilds routes.
    #[instrument(skip(self, descriptor))]
    pub fn add_remote_module(
        &self,
        key: &str,
        mut descriptor: RemoteDescriptor,
    ) -> Result<RemoteDescriptor, ShellError> {
        descriptor.key = key.to_string();
        let descriptor = descriptor.explicit();
        descriptor.validate()?;

        let replaced = self.registry().set(key, descriptor.clone()).is_some();
        info!(
            remote = %key,
            route_path = %descriptor.route_path,
            replaced,
            "Remote module added"
        );
        self.rebuild_routes();
        Ok(descriptor)
    }

    /// Discovers and registers a remote in the background.
    ///
    /// Returns as soon as the input is validated; the registry and routes are
    /// updated when the manifest fetch settles.
    pub fn register_remote_app(
        self: &Arc<Self>,
        name: &str,
        base_url: &str,
    ) -> Result<(), ShellError> {
        let remote = KnownRemote::new(name, base_url);
        remote
            .validate()
            .map_err(|e| ShellError::invalid(e.to_string()))?;

        let shell = Arc::clone(self);
        tokio::spawn(async move {
            shell.initializer.register_remote(&remote).await;
            shell.rebuild_routes();
        });
        Ok(())
    }

    /// Registered descriptors in registration order.
    pub fn remote_modules(&self) -> Vec<RemoteDescriptor> {
        self.registry().list()
    }

    /// Registered descriptors keyed by registry key.
    pub fn remote_modules_v2(&self) -> IndexMap<String, RemoteDescriptor> {
        self.registry()
            .list()
            .into_iter()
            .map(|d| (d.key.clone(), d))
            .collect()
    }

    pub fn remote_module(&self, key: &str) -> Result<RemoteDescriptor, ShellError> {
        self.registry()
            .get(key)
            .ok_or_else(|| ShellError::RemoteNotFound(key.to_string()))
    }

    /// Loads the module registered under `key` on demand.
    pub async fn load_remote_module(&self, key: &str) -> Result<LoadedUnit, ShellError> {
        let descriptor = self.remote_module(key)?;
        let request = LoadRequest::from(&descriptor);
        self.loader.load_module(&request).await.map_err(|e| {
            tracing::warn!(remote = %key, error = %e, "Failed to load remote module");
            ShellError::from(e)
        })
    }

    pub async fn navigate(&self, path: &str) -> Result<Navigation, ShellError> {
        Ok(self.router.navigate(path, self.loader.as_ref()).await?)
    }
}
