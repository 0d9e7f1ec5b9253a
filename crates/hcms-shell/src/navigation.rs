//! Catch-all navigation: resolves the request path against the active route
//! table and serves the host page of the matched remote.

use axum::{
    extract::State,
    http::{Method, Uri},
    response::Html,
};

use crate::error::ShellError;
use crate::server::AppState;
use crate::views;

pub async fn navigate(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Html<String>, ShellError> {
    let path = uri.path();
    if method != Method::GET {
        return Err(ShellError::RouteNotFound(path.to_string()));
    }

    let navigation = state.shell.navigate(path).await?;
    let html = match &navigation.unit {
        Some(unit) => views::remote_host(&navigation.route, unit),
        None => views::home(&state.shell.remote_modules()),
    };
    Ok(Html(html))
}
