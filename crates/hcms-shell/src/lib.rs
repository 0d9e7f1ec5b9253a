//! HCMS portal shell: an axum service that discovers remote modules, keeps
//! them in a registry and serves the portal routes built from it.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod navigation;
pub mod observability;
pub mod server;
pub mod shell;
pub mod views;

pub use config::{
    AppConfig, DashboardConfig, DashboardSlotConfig, LoaderConfig, LoggingConfig, RegistryConfig,
    ServerConfig,
};
pub use error::ShellError;
pub use observability::init_tracing;
pub use server::{AppState, PortalServer, ServerBuilder, build_app, router};
pub use shell::PortalShell;
