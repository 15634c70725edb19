//! HTTP client abstraction for testability.

use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::FetchError;

/// Knobs for origin fetch behavior.
///
/// The defaults deliberately preserve the engine's historical observable
/// behavior: no request timeout and no retries. Callers that want a stalled
/// fetch to fail (instead of stalling its job) opt in explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// Per-request timeout. `None` lets a request run indefinitely.
    pub timeout: Option<Duration>,
    /// Additional attempts after a failed fetch.
    pub retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: 0,
        }
    }
}

/// Trait for HTTP GET operations.
///
/// Allows dependency injection: tests drive the fetch pipeline with mock
/// clients instead of a live tile server.
pub trait HttpClient: Send + Sync {
    /// Perform an HTTP GET request, returning the response body.
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, FetchError>>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
    config: FetchConfig,
}

impl ReqwestClient {
    /// Create a client with default configuration (no timeout, no retries).
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a client with explicit fetch configuration.
    pub fn with_config(config: FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn get_once(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Http(format!("failed to read response: {}", e)))
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
        let url = url.to_string();
        Box::pin(async move {
            let mut attempt = 0;
            loop {
                match self.get_once(&url).await {
                    Ok(body) => {
                        debug!(url = %url, bytes = body.len(), "fetched tile body");
                        return Ok(body);
                    }
                    Err(e) if attempt < self.config.retries => {
                        attempt += 1;
                        warn!(url = %url, error = %e, attempt, "fetch failed, retrying");
                    }
                    Err(e) => return Err(e),
                }
            }
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Mock HTTP client returning canned responses and recording calls.
    pub struct MockHttpClient {
        responses: Mutex<Vec<Result<Vec<u8>, FetchError>>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        /// Always return the same response.
        pub fn always(response: Result<Vec<u8>, FetchError>) -> Self {
            Self {
                responses: Mutex::new(vec![response]),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
            self.requests.lock().push(url.to_string());
            let response = self.responses.lock()[0].clone();
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockHttpClient::always(Ok(vec![1, 2, 3, 4]));
        let result = mock.get("http://tiles.example.org/1/2/3").await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockHttpClient::always(Err(FetchError::Http("boom".into())));
        let result = mock.get("http://tiles.example.org/1/2/3").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_config_defaults_preserve_legacy_behavior() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, None);
        assert_eq!(config.retries, 0);
    }
}
