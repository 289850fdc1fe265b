//! HTTP client abstraction for testability

use std::time::Duration;

use tokio::runtime::Handle;
use tracing::warn;

use super::types::ProviderError;

/// Default request timeout for tile downloads.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent sent with every request. Public tile servers reject
/// anonymous clients.
pub const USER_AGENT: &str = concat!("tileview/", env!("CARGO_PKG_VERSION"));

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Real HTTP client implementation using reqwest.
///
/// The blocking reqwest client runs its own runtime, which Tokio refuses to
/// start or shut down on an async worker thread. Construction and teardown
/// are therefore moved to a plain thread whenever a Tokio runtime is
/// current, so the client can be owned by async code.
pub struct ReqwestClient {
    // Always `Some` until dropped.
    client: Option<reqwest::blocking::Client>,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Creates a new ReqwestClient with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let build = move || {
            reqwest::blocking::Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()
        };

        let built = if Handle::try_current().is_ok() {
            std::thread::scope(|scope| scope.spawn(build).join()).map_err(|_| {
                ProviderError::HttpError("HTTP client builder panicked".to_string())
            })?
        } else {
            build()
        };

        let client = built.map_err(|e| {
            ProviderError::HttpError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client: Some(client),
        })
    }
}

impl Drop for ReqwestClient {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        if Handle::try_current().is_err() {
            return;
        }

        let spawned = std::thread::Builder::new()
            .name("tileview-http-drop".to_string())
            .spawn(move || drop(client));
        if let Err(e) = spawned {
            warn!(error = %e, "Failed to move HTTP client teardown off the runtime");
        }
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        // Errors are stripped of the URL: it may carry an API key.
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ProviderError::HttpError("HTTP client closed".to_string()))?;
        let response = client
            .get(url)
            .send()
            .map_err(|e| ProviderError::HttpError(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().map_err(|e| {
            ProviderError::HttpError(format!("Failed to read response: {}", e.without_url()))
        })?;

        if body.is_empty() {
            return Err(ProviderError::InvalidResponse("empty body".to_string()));
        }

        Ok(body.to_vec())
    }
}
