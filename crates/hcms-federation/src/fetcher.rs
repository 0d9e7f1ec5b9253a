//! Manifest Fetcher
//!
//! Best-effort retrieval of `{baseUrl}/assets/manifest.json` for each known
//! remote. Every fetch stands alone: a failure degrades that one remote to
//! "no manifest" and never aborts the batch.

use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use hcms_core::{Manifest, naming};

use crate::known::KnownRemote;

/// Configuration for manifest fetching.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// HTTP request timeout (default: 10 seconds).
    pub request_timeout: Duration,

    /// Maximum manifest size in bytes (default: 64 KiB).
    pub max_response_size: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_response_size: 64 * 1024,
        }
    }
}

impl FetcherConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the maximum manifest size.
    #[must_use]
    pub fn with_max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }
}

/// Errors that can occur while fetching a manifest.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The base URL is not an absolute http(s) URL.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// A network error occurred (connection refused, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The manifest endpoint returned a non-success status code.
    #[error("HTTP error: status {0}")]
    Http(u16),

    /// The body was not a valid manifest.
    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    /// The body exceeded the maximum allowed size.
    #[error("Manifest exceeds maximum size of {max_size} bytes")]
    ResponseTooLarge { max_size: usize },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Result of fetching one remote's manifest, tagged with the remote.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub remote: KnownRemote,
    pub result: Result<Manifest, FetchError>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// HTTP client for remote manifests.
#[derive(Debug, Clone)]
pub struct ManifestFetcher {
    http_client: reqwest::Client,
    config: FetcherConfig,
}

impl ManifestFetcher {
    /// Creates a fetcher with its own HTTP client.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Fetches and parses the manifest of the remote served at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the request fails, the endpoint
    /// answers with a non-2xx status, or the body is oversized or malformed.
    pub async fn fetch(&self, base_url: &str) -> Result<Manifest, FetchError> {
        naming::validate_base_url(base_url)
            .map_err(|e| FetchError::InvalidBaseUrl(e.to_string()))?;

        let manifest_url = naming::manifest_url_for(base_url);

        let response = self
            .http_client
            .get(&manifest_url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_response_size
        {
            return Err(FetchError::ResponseTooLarge {
                max_size: self.config.max_response_size,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if body.len() > self.config.max_response_size {
            return Err(FetchError::ResponseTooLarge {
                max_size: self.config.max_response_size,
            });
        }

        let manifest: Manifest =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        if manifest.is_empty() {
            debug!(url = %manifest_url, "Manifest carries no routing fields; conventions apply");
        } else {
            debug!(url = %manifest_url, "Fetched remote manifest");
        }
        Ok(manifest)
    }

    /// Fetches every remote's manifest concurrently.
    ///
    /// Outcomes are returned in the order of `remotes`, one per remote, once
    /// every request has settled.
    pub async fn fetch_all(&self, remotes: &[KnownRemote]) -> Vec<FetchOutcome> {
        let fetches = remotes.iter().map(|remote| async move {
            let result = self.fetch(&remote.base_url).await;
            if let Err(e) = &result {
                warn!(
                    remote = %remote.name,
                    manifest_url = %remote.manifest_url(),
                    error = %e,
                    "Manifest unavailable"
                );
            }
            FetchOutcome {
                remote: remote.clone(),
                result,
            }
        });

        join_all(fetches).await
    }
}
