use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use hcms_core::{DescriptorOrigin, RemoteDescriptor, naming};

use crate::dashboard;
use crate::error::ShellError;
use crate::server::AppState;
use crate::views;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root(State(state): State<AppState>) -> Html<String> {
    Html(views::home(&state.shell.remote_modules()))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.shell.is_ready() {
        (StatusCode::OK, Json(HealthResponse { status: "ready" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "starting" }),
        )
    }
}

// ---- Registry API ----

pub async fn list_remotes(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.shell.remote_modules())
}

pub async fn list_remotes_v2(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.shell.remote_modules_v2())
}

pub async fn get_remote(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RemoteDescriptor>, ShellError> {
    Ok(Json(state.shell.remote_module(&key)?))
}

/// Body of `PUT /api/remotes/{key}`; omitted fields follow naming conventions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteModuleBody {
    pub entry_url: String,
    #[serde(default)]
    pub exposed_module: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub route_path: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl RemoteModuleBody {
    fn into_descriptor(self, key: &str) -> RemoteDescriptor {
        RemoteDescriptor {
            key: key.to_string(),
            entry_url: self.entry_url,
            exposed_module: self
                .exposed_module
                .unwrap_or_else(|| naming::DEFAULT_EXPOSED_MODULE.to_string()),
            display_name: self
                .display_name
                .unwrap_or_else(|| naming::title_case(key)),
            route_path: self
                .route_path
                .unwrap_or_else(|| naming::default_route_path(key)),
            version: self.version,
            origin: DescriptorOrigin::Explicit,
        }
    }
}

pub async fn put_remote(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<RemoteModuleBody>,
) -> Result<Json<RemoteDescriptor>, ShellError> {
    let descriptor = body.into_descriptor(&key);
    Ok(Json(state.shell.add_remote_module(&key, descriptor)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub base_url: String,
}

pub async fn register_remote(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ShellError> {
    state.shell.register_remote_app(&req.name, &req.base_url)?;
    let body = json!({
        "status": "accepted",
        "name": req.name,
        "baseUrl": req.base_url,
    });
    Ok((StatusCode::ACCEPTED, Json(body)))
}

pub async fn load_remote(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ShellError> {
    let unit = state.shell.load_remote_module(&key).await?;
    Ok(Json(unit))
}

pub async fn list_routes(State(state): State<AppState>) -> impl IntoResponse {
    let table = state.shell.router().table();
    Json(table.routes().to_vec())
}

pub async fn refresh_registry(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.shell.refresh().await;
    Json(report.as_ref().clone())
}

// ---- Shared dashboard ----

pub async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let mounts = dashboard::mount_slots(&state.shell, &state.config.dashboard.slots).await;
    Html(views::dashboard(&mounts))
}

pub async fn dashboard_api(State(state): State<AppState>) -> impl IntoResponse {
    Json(dashboard::mount_slots(&state.shell, &state.config.dashboard.slots).await)
}
