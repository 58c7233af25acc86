//! The refresh cycle: fetch, merge, publish.
//!
//! Network calls happen before the cache is touched, so a slow upstream never
//! blocks readers, and an Overpass failure abandons the tick without
//! replacing the published snapshot. A park feed failure is not fatal: the
//! merge runs with no records and passes the OSM document through.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};
use pota_cache_core::{SnapshotCache, merge};
use pota_cache_data::{
    FailureClass, OverpassSource, ParkFeedClient, ParkFeedSource, UpstreamError,
};
use thiserror::Error;
use tokio::time::{MissedTickBehavior, interval};

/// Outcome of one successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// Elements in the published snapshot.
    pub element_count: usize,
    /// Position of the snapshot in the publish sequence.
    pub refresh_count: u64,
    /// When the snapshot was published.
    pub published_at: DateTime<Utc>,
    /// Time spent fetching and merging.
    pub elapsed: Duration,
}

/// Reasons a refresh was abandoned.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The Overpass fetch failed; the previous snapshot stays current.
    #[error("overpass fetch failed: {0}")]
    Overpass(#[from] UpstreamError),
}

impl RefreshError {
    /// Classify the failure.
    #[must_use]
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Overpass(err) => err.class(),
        }
    }
}

/// Something that can run a refresh on demand.
#[async_trait]
pub trait Refresher: Send + Sync {
    /// Run one refresh; `force` bypasses the park feed's freshness window.
    async fn refresh(&self, force: bool) -> Result<RefreshReport, RefreshError>;
}

/// Fetches both upstreams, merges them and publishes the result.
#[derive(Debug)]
pub struct RefreshService<O, P> {
    overpass: O,
    parks: ParkFeedClient<P>,
    cache: Arc<SnapshotCache>,
}

impl<O, P> RefreshService<O, P>
where
    O: OverpassSource,
    P: ParkFeedSource,
{
    /// Service publishing into `cache`.
    #[must_use]
    pub fn new(overpass: O, parks: ParkFeedClient<P>, cache: Arc<SnapshotCache>) -> Self {
        Self {
            overpass,
            parks,
            cache,
        }
    }

    /// The cache this service publishes into.
    #[must_use]
    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// The OSM source.
    #[must_use]
    pub fn overpass_source(&self) -> &O {
        &self.overpass
    }

    /// The park feed client.
    #[must_use]
    pub fn park_feed(&self) -> &ParkFeedClient<P> {
        &self.parks
    }

    /// Run one refresh cycle.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::Overpass`] when the OSM fetch fails; the cache
    /// is left untouched in that case.
    pub async fn refresh_once(&self, force: bool) -> Result<RefreshReport, RefreshError> {
        let started = Instant::now();
        let osm = self.overpass.fetch().await?;
        let parks = match self.parks.get_current(force).await {
            Ok(parks) => parks,
            Err(err) => {
                warn!(
                    "park feed unavailable ({:?}): {err}; keeping OSM elements as fetched",
                    err.class()
                );
                Vec::new()
            }
        };
        let merged = merge(osm, &parks);
        let status = self.cache.publish(merged);
        let elapsed = started.elapsed();
        let published_at = status.last_update.unwrap_or_else(Utc::now);
        info!(
            "cache refreshed (#{}). total elements: {}. updated at {}. processing time: {:.2?}",
            status.refresh_count,
            status.element_count,
            published_at.to_rfc3339(),
            elapsed
        );
        Ok(RefreshReport {
            element_count: status.element_count,
            refresh_count: status.refresh_count,
            published_at,
            elapsed,
        })
    }

    /// Refresh every `period`, forever.
    ///
    /// The first refresh happens one full period after the call; callers run
    /// the start-up refresh themselves. Failures are logged and the loop
    /// carries on.
    pub async fn run(&self, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = self.refresh_once(false).await {
                warn!("refresh abandoned ({:?}): {err}", err.class());
            }
        }
    }
}

#[async_trait]
impl<O, P> Refresher for RefreshService<O, P>
where
    O: OverpassSource,
    P: ParkFeedSource,
{
    async fn refresh(&self, force: bool) -> Result<RefreshReport, RefreshError> {
        self.refresh_once(force).await
    }
}
