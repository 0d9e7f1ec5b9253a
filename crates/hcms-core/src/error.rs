use thiserror::Error;

/// Core error types for portal shell operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Remote module not found: {0}")]
    RemoteNotFound(String),

    #[error("Invalid remote descriptor for '{key}': {message}")]
    InvalidDescriptor { key: String, message: String },

    #[error("Invalid remote base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl CoreError {
    /// Create a new RemoteNotFound error
    pub fn remote_not_found(key: impl Into<String>) -> Self {
        Self::RemoteNotFound(key.into())
    }

    /// Create a new InvalidDescriptor error
    pub fn invalid_descriptor(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new InvalidBaseUrl error
    pub fn invalid_base_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::RemoteNotFound(_)
                | Self::InvalidDescriptor { .. }
                | Self::InvalidBaseUrl { .. }
                | Self::JsonError(_)
                | Self::UrlError(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RemoteNotFound(_) => ErrorCategory::NotFound,
            Self::InvalidDescriptor { .. } | Self::InvalidBaseUrl { .. } | Self::UrlError(_) => {
                ErrorCategory::Validation
            }
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Serialization,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
