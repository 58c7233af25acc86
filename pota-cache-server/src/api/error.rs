use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::warn;
use pota_cache_core::BBoxParseError;
use thiserror::Error;

/// Request failures surfaced to query callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Neither `data` nor `query` carried any text.
    #[error("Missing query data")]
    MissingQuery,
    /// The query text held no usable bounding box.
    #[error("Invalid query format: {0}")]
    InvalidQuery(#[from] BBoxParseError),
    /// No snapshot has been published yet.
    #[error("No cached data available")]
    NoCacheYet,
}

impl ApiError {
    /// HTTP status for this failure.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingQuery | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::NoCacheYet => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("rejecting query: {self}");
        (self.status(), self.to_string()).into_response()
    }
}
