//! The POTA park CSV feed and its on-disk freshness cache.
//!
//! [`ParkFeedClient`] is the entry point: it answers from the local copy
//! while that copy is younger than the freshness window, fetches otherwise,
//! and falls back to the local copy when a fetch fails.

mod cache;
mod client;
mod normalise;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::error::UpstreamError;
use crate::http::{ClientBuildError, HttpSourceConfig};

pub use cache::FeedCache;
pub use client::{DEFAULT_FEED_MAX_AGE, ParkFeedClient};
pub use normalise::parse_park_csv;

/// Published CSV of every POTA park.
pub const DEFAULT_PARK_FEED_URL: &str = "https://pota.app/all_parks_ext.csv";

/// Source of the raw park CSV text.
#[async_trait]
pub trait ParkFeedSource: Send + Sync {
    /// Endpoint the source talks to, for logging.
    fn url(&self) -> &str;
    /// Fetch the CSV body.
    async fn fetch_csv(&self) -> Result<String, UpstreamError>;
}

/// HTTP implementation of [`ParkFeedSource`].
#[derive(Debug)]
pub struct HttpParkFeedSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpParkFeedSource {
    /// Create a source for `url` with default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpSourceConfig::new(url))
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(config: HttpSourceConfig) -> Result<Self, ClientBuildError> {
        let client = config.build_client()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ParkFeedSource for HttpParkFeedSource {
    fn url(&self) -> &str {
        &self.config.url
    }

    async fn fetch_csv(&self) -> Result<String, UpstreamError> {
        debug!("downloading park feed from {}", self.config.url);
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|err| self.config.convert_error(&err))?
            .error_for_status()
            .map_err(|err| self.config.convert_error(&err))?;
        response
            .text()
            .await
            .map_err(|err| self.config.convert_error(&err))
    }
}
