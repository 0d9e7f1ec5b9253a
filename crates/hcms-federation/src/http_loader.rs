//! HTTP-backed module loader.
//!
//! Confirms a remote's federation entry is being served and describes the unit
//! it exposes. Evaluating the entry is left to the browser that receives the
//! host page.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use hcms_core::{LoadError, LoadRequest, LoadedUnit, ModuleLoader};

/// Loads modules by fetching their remote entry over HTTP.
#[derive(Debug, Clone)]
pub struct HttpModuleLoader {
    http_client: reqwest::Client,
}

impl HttpModuleLoader {
    /// Creates a loader whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Unreachable {
                url: String::new(),
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl ModuleLoader for HttpModuleLoader {
    #[instrument(skip(self), fields(entry_url = %request.entry_url, exposed_module = %request.exposed_module))]
    async fn load_module(&self, request: &LoadRequest) -> Result<LoadedUnit, LoadError> {
        if !request.entry_url.starts_with("http://") && !request.entry_url.starts_with("https://") {
            return Err(LoadError::Unsupported {
                url: request.entry_url.clone(),
                exposed_module: request.exposed_module.clone(),
            });
        }

        let response = self
            .http_client
            .get(&request.entry_url)
            .send()
            .await
            .map_err(|e| LoadError::Unreachable {
                url: request.entry_url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                url: request.entry_url.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| LoadError::Unreachable {
            url: request.entry_url.clone(),
            message: e.to_string(),
        })?;

        if body.is_empty() {
            return Err(LoadError::EmptyEntry(request.entry_url.clone()));
        }

        debug!(size_bytes = body.len(), "Remote entry fetched");

        Ok(LoadedUnit {
            entry_url: request.entry_url.clone(),
            exposed_module: request.exposed_module.clone(),
            export: request.expected_export(),
            content_type,
            size_bytes: body.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_http_entries_are_unsupported() {
        let loader = HttpModuleLoader::new(Duration::from_secs(1)).unwrap();
        let err = loader
            .load_module(&LoadRequest::new("file:///tmp/remoteEntry.js", "./Routes"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Unsupported { .. }));
    }
}
