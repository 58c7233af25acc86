//! HTTP server and refresh loop for the POTA Overpass cache.
//!
//! Responsibilities:
//! - Layer CLI flags, environment and config files into a [`ServeConfig`].
//! - Refresh the snapshot on a fixed period and on demand.
//! - Answer Overpass-style bounding-box queries from the current snapshot.
//!
//! Boundaries:
//! - Merge and filter rules live in `pota-cache-core`; upstream access in
//!   `pota-cache-data`.
#![forbid(unsafe_code)]

pub mod api;
mod config;
mod error;
pub mod refresh;

use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use pota_cache_core::SnapshotCache;
use pota_cache_data::{
    FeedCache, HttpOverpassSource, HttpParkFeedSource, HttpSourceConfig, ParkFeedClient,
};
use tokio::net::TcpListener;

pub use api::{ApiError, AppState, router};
pub use config::{
    DEFAULT_BIND, DEFAULT_CACHE_DIR, DEFAULT_FEED_MAX_AGE_SECS, DEFAULT_REFRESH_INTERVAL_SECS,
    DEFAULT_RELOAD_PATH, DEFAULT_UPSTREAM_TIMEOUT_SECS, ServeArgs, ServeConfig,
};
pub use error::ServerError;
pub use refresh::{RefreshError, RefreshReport, RefreshService, Refresher};

use config::{Cli, Command};

/// Run the server with the current process arguments and environment.
///
/// # Errors
///
/// Fails on invalid arguments or configuration, or when the listener cannot
/// be bound.
pub async fn run() -> Result<(), ServerError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Serve(args) => serve(args.into_config()?).await,
    }
}

/// Refresh once, then serve until Ctrl-C.
///
/// A failed start-up refresh is logged and the server starts anyway; queries
/// answer 503 until a later refresh succeeds.
///
/// # Errors
///
/// Fails when an HTTP client cannot be built, the listener cannot be bound,
/// or the server stops with an I/O error.
pub async fn serve(config: ServeConfig) -> Result<(), ServerError> {
    let overpass = HttpOverpassSource::with_config(
        HttpSourceConfig::new(config.overpass_url.as_str()).with_timeout(config.upstream_timeout),
    )?;
    let feed = HttpParkFeedSource::with_config(
        HttpSourceConfig::new(config.park_feed_url.as_str())
            .with_timeout(config.upstream_timeout),
    )?;
    let parks = ParkFeedClient::new(feed, FeedCache::new(config.cache_dir.clone()))
        .with_max_age(config.feed_max_age)
        .with_active_only(config.active_only);
    let cache = Arc::new(SnapshotCache::new());
    let service = Arc::new(RefreshService::new(overpass, parks, Arc::clone(&cache)));

    if let Err(err) = service.refresh_once(false).await {
        warn!("initial refresh failed ({:?}): {err}", err.class());
    }

    let background = Arc::clone(&service);
    let period = config.refresh_interval;
    let ticker = tokio::spawn(async move { background.run(period).await });

    let app = router(AppState::new(cache, service), &config.reload_path);
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    info!(
        "listening on {}; refreshing every {:?}",
        config.bind, config.refresh_interval
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve);
    ticker.abort();
    served
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            warn!("failed to listen for Ctrl-C: {err}; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
