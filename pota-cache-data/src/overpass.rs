//! Fetch every POTA-tagged element from an Overpass endpoint.
//!
//! The query is fixed: all nodes, ways and relations carrying
//! `communication:amateur_radio:pota`, returned with full geometry so the
//! cache can filter ways and relations without further lookups.

use async_trait::async_trait;
use log::debug;
use pota_cache_core::OverpassDocument;
use reqwest::Client;

use crate::error::UpstreamError;
use crate::http::{ClientBuildError, HttpSourceConfig};

/// Public Overpass interpreter used when no endpoint is configured.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Overpass QL selecting every POTA-tagged element with geometry.
pub const POTA_QUERY: &str =
    r#"[out:json];(nwr["communication:amateur_radio:pota"];);out geom;"#;

/// Source of the raw OpenStreetMap snapshot.
#[async_trait]
pub trait OverpassSource: Send + Sync {
    /// Endpoint the source talks to, for logging.
    fn url(&self) -> &str;
    /// Fetch all POTA-tagged elements.
    async fn fetch(&self) -> Result<OverpassDocument, UpstreamError>;
}

/// HTTP implementation of [`OverpassSource`].
#[derive(Debug)]
pub struct HttpOverpassSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpOverpassSource {
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
impl OverpassSource for HttpOverpassSource {
    fn url(&self) -> &str {
        &self.config.url
    }

    async fn fetch(&self) -> Result<OverpassDocument, UpstreamError> {
        debug!("querying Overpass at {}", self.config.url);
        let response = self
            .client
            .get(&self.config.url)
            .query(&[("data", POTA_QUERY)])
            .send()
            .await
            .map_err(|err| self.config.convert_error(&err))?
            .error_for_status()
            .map_err(|err| self.config.convert_error(&err))?;

        response
            .json::<OverpassDocument>()
            .await
            .map_err(|err| self.config.convert_error(&err))
    }
}
