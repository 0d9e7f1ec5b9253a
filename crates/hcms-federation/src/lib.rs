//! Remote-module federation for the HCMS portal shell.
//!
//! ```text
//! KnownRemote list ──▶ RegistryInitializer ──(ManifestFetcher)──▶ RemoteRegistry
//!                                                                      │
//!                                            build_routes(snapshot) ◀──┘
//!                                                      │
//!                                                      ▼
//!                                   PortalRouter ──navigate──▶ ModuleLoader
//! ```

pub mod fetcher;
pub mod http_loader;
pub mod initializer;
pub mod known;
pub mod registry;
pub mod routes;

pub use fetcher::{FetchError, FetchOutcome, FetcherConfig, ManifestFetcher};
pub use http_loader::HttpModuleLoader;
pub use initializer::{InitReport, RegistryInitializer, RemoteInitStatus};
pub use known::{KnownRemote, default_known_remotes};
pub use registry::RemoteRegistry;
pub use routes::{
    HOME_ROUTE_PATH, Navigation, NavigationError, PortalRoute, PortalRouter, RouteTable,
    RouteTarget, build_routes,
};
