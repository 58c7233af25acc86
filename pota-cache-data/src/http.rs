//! Shared HTTP client construction and error conversion.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::error::UpstreamError;

/// Default user agent for upstream requests.
pub const DEFAULT_USER_AGENT: &str = "pota-cache/0.1";

/// Default request timeout in seconds. Full Overpass extracts are slow.
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Connect timeout ceiling in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Failure to construct the underlying HTTP client.
#[derive(Debug, Error)]
#[error("failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

/// Endpoint, timeout and user agent for one upstream source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Fully qualified endpoint URL.
    pub url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl HttpSourceConfig {
    /// Create a configuration for `url` with default timeout and user agent.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn build_client(&self) -> Result<Client, ClientBuildError> {
        let connect_timeout = self.timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS));
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(connect_timeout)
            .timeout(self.timeout)
            .build()?;
        Ok(client)
    }

    /// Convert a reqwest error into an [`UpstreamError`] for this endpoint.
    pub(crate) fn convert_error(&self, error: &reqwest::Error) -> UpstreamError {
        let url = self.url.clone();
        if error.is_timeout() {
            return UpstreamError::Timeout {
                url,
                timeout_secs: self.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return UpstreamError::Http {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        if error.is_decode() {
            return UpstreamError::Malformed {
                url,
                message: error.to_string(),
            };
        }
        UpstreamError::Network {
            url,
            message: error.to_string(),
        }
    }
}
