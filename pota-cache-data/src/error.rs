//! Errors produced while talking to the upstream sources.

use thiserror::Error;

/// Coarse classification of an upstream failure.
///
/// Refresh logic only needs to know whether the source was unreachable or
/// answered with something it could not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Network failure, timeout or non-success status.
    UpstreamUnavailable,
    /// The source answered with an unexpected JSON or CSV shape.
    MalformedUpstream,
}

/// Transport-level errors encountered while issuing HTTP requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UpstreamError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Configured request timeout.
        timeout_secs: u64,
    },
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// Error reported by the transport.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("malformed response from {url}: {message}")]
    Malformed {
        /// Fully qualified request URL.
        url: String,
        /// Decoder error.
        message: String,
    },
}

impl UpstreamError {
    /// Classify the failure.
    #[must_use]
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Malformed { .. } => FailureClass::MalformedUpstream,
            Self::Timeout { .. } | Self::Http { .. } | Self::Network { .. } => {
                FailureClass::UpstreamUnavailable
            }
        }
    }
}

/// Errors produced while obtaining the park feed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParkFeedError {
    /// Fetching the CSV failed and no cached copy was available.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// The CSV could not be read.
    #[error("park feed CSV is malformed: {source}")]
    Csv {
        /// Underlying CSV reader error.
        #[source]
        source: csv::Error,
    },
    /// The body has too few columns or yields no usable park.
    #[error("park feed has no usable rows: {reason}")]
    NoUsableRows {
        /// What was wrong with the body.
        reason: String,
    },
}

impl ParkFeedError {
    /// Classify the failure.
    #[must_use]
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Upstream(err) => err.class(),
            Self::Csv { .. } | Self::NoUsableRows { .. } => FailureClass::MalformedUpstream,
        }
    }
}

impl From<csv::Error> for ParkFeedError {
    fn from(source: csv::Error) -> Self {
        Self::Csv { source }
    }
}
