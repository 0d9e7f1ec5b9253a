//! Shell error type and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use hcms_core::{CoreError, LoadError};
use hcms_federation::NavigationError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Remote module '{0}' is not registered")]
    RemoteNotFound(String),

    #[error("No route matches '{0}'")]
    RouteNotFound(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Failed to load remote module: {0}")]
    LoadFailed(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShellError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RemoteNotFound(_) | Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::LoadFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code used in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RemoteNotFound(_) | Self::RouteNotFound(_) => "not-found",
            Self::Invalid(_) => "invalid",
            Self::LoadFailed(_) => "load-failed",
            Self::Configuration(_) => "configuration",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<CoreError> for ShellError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RemoteNotFound(key) => Self::RemoteNotFound(key),
            CoreError::Configuration(msg) => Self::Configuration(msg),
            other if other.is_client_error() => Self::Invalid(other.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<NavigationError> for ShellError {
    fn from(err: NavigationError) -> Self {
        match err {
            NavigationError::NoRoute(path) => Self::RouteNotFound(path),
            NavigationError::LoadFailed { source, .. } => Self::LoadFailed(source),
        }
    }
}

impl IntoResponse for ShellError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }
        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
