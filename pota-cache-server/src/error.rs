//! Errors surfaced by the server entry point.

use std::{io, net::SocketAddr, sync::Arc};

use pota_cache_data::ClientBuildError;
use thiserror::Error;

/// Errors emitted while configuring or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A merged setting has an unusable value.
    #[error("invalid {field}: {reason} (set --{field})")]
    InvalidSetting {
        /// Flag name of the offending setting.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// An upstream HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientBuildError),
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested listen address.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// The HTTP server stopped with an error.
    #[error("server failed: {0}")]
    Serve(#[source] io::Error),
}
