use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::AppConfig, error::ShellError, handlers, middleware as app_middleware, navigation,
    shell::PortalShell,
};

#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<PortalShell>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(shell: Arc<PortalShell>, config: AppConfig) -> Self {
        Self {
            shell,
            config: Arc::new(config),
        }
    }
}

pub struct PortalServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the shell from configuration, runs registry initialization and
/// returns the app with routes installed.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, ShellError> {
    let state = start_shell(cfg).await?;
    Ok(router(state))
}

async fn start_shell(cfg: &AppConfig) -> Result<AppState, ShellError> {
    cfg.validate().map_err(ShellError::configuration)?;
    let shell = Arc::new(PortalShell::from_config(cfg)?);
    let report = shell.start().await;
    tracing::info!(
        generation = report.generation,
        remotes = report.remotes.len(),
        routes = shell.router().table().len(),
        "Portal routes installed"
    );
    Ok(AppState::new(shell, cfg.clone()))
}

/// HTTP surface of the shell over an existing state.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    Router::new()
        // Health and home
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Registry API
        .route("/api/remotes", get(handlers::list_remotes))
        .route("/api/v2/remotes", get(handlers::list_remotes_v2))
        .route("/api/remotes/register", post(handlers::register_remote))
        .route(
            "/api/remotes/{key}",
            get(handlers::get_remote).put(handlers::put_remote),
        )
        .route("/api/remotes/{key}/load", post(handlers::load_remote))
        .route("/api/routes", get(handlers::list_routes))
        .route("/api/registry/refresh", post(handlers::refresh_registry))
        // Shared dashboard
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/api/dashboard", get(handlers::dashboard_api))
        // Everything else is resolved against the portal route table
        .fallback(navigation::navigate)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &axum::http::Request<_>| {
                            use tracing::field::Empty;
                            let req_id = req
                                .extensions()
                                .get::<axum::http::HeaderValue>()
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("")
                                .to_string();
                            tracing::info_span!(
                                "http.request",
                                http.method = %req.method(),
                                http.target = %req.uri(),
                                http.status_code = Empty,
                                request_id = %req_id
                            )
                        })
                        .on_response(
                            |res: &axum::http::Response<_>,
                             latency: std::time::Duration,
                             span: &tracing::Span| {
                                span.record(
                                    "http.status_code",
                                    tracing::field::display(res.status().as_u16()),
                                );
                                tracing::info!(
                                    http.status = %res.status().as_u16(),
                                    elapsed_ms = %latency.as_millis(),
                                    "request handled"
                                );
                            },
                        ),
                )
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
        // Outermost so the trace span sees the id
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Initializes the registry and installs routes; the listener is not bound yet.
    pub async fn build(self) -> Result<PortalServer, ShellError> {
        let state = start_shell(&self.config).await?;
        Ok(PortalServer {
            addr: self.addr,
            app: router(state),
        })
    }
}

impl PortalServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
