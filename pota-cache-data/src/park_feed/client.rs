use std::time::Duration;

use chrono::{TimeDelta, Utc};
use log::{info, warn};
use pota_cache_core::ParkRecord;
use tokio::sync::Mutex;

use super::{FeedCache, ParkFeedSource, parse_park_csv};
use crate::error::ParkFeedError;

/// Re-fetch floor for the park feed.
pub const DEFAULT_FEED_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Park feed access with a local freshness window.
///
/// Calls are serialised so a forced reload and a periodic refresh never
/// interleave their cache writes.
#[derive(Debug)]
pub struct ParkFeedClient<S> {
    source: S,
    cache: FeedCache,
    max_age: TimeDelta,
    active_only: bool,
    lock: Mutex<()>,
}

impl<S: ParkFeedSource> ParkFeedClient<S> {
    /// Client fetching from `source` and caching under `cache`.
    ///
    /// Defaults to a one-hour freshness window and active parks only.
    #[must_use]
    pub fn new(source: S, cache: FeedCache) -> Self {
        Self {
            source,
            cache,
            max_age: to_time_delta(DEFAULT_FEED_MAX_AGE),
            active_only: true,
            lock: Mutex::new(()),
        }
    }

    /// Set the freshness window.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = to_time_delta(max_age);
        self
    }

    /// Keep inactive parks when `false`.
    #[must_use]
    pub fn with_active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current park records.
    ///
    /// A fresh local copy is returned without touching the network unless
    /// `force` is set. Otherwise the feed is fetched, normalised and stored;
    /// if that fails the local copy is returned regardless of its age.
    ///
    /// # Errors
    ///
    /// Returns the fetch or parse error when no local copy exists.
    pub async fn get_current(&self, force: bool) -> Result<Vec<ParkRecord>, ParkFeedError> {
        let _guard = self.lock.lock().await;

        if !force {
            let max_age = self.max_age;
            let fresh = self
                .on_disk(move |cache| {
                    cache
                        .is_fresh(Utc::now(), max_age)
                        .then(|| cache.load())
                        .flatten()
                })
                .await;
            if let Some(records) = fresh {
                info!("using cached park feed ({} parks)", records.len());
                return Ok(records);
            }
        }

        info!("fetching park feed from {}", self.source.url());
        match self.fetch_and_store().await {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!("park feed fetch failed: {err}; trying cached copy");
                match self.on_disk(FeedCache::load).await {
                    Some(records) => {
                        info!("falling back to cached park feed ({} parks)", records.len());
                        Ok(records)
                    }
                    None => Err(err),
                }
            }
        }
    }

    async fn fetch_and_store(&self) -> Result<Vec<ParkRecord>, ParkFeedError> {
        let body = self.source.fetch_csv().await?;
        let records = parse_park_csv(&body, self.active_only)?;
        let fetched_at = Utc::now();
        let stored = records.clone();
        self.on_disk(move |cache| {
            cache.store(&stored, fetched_at);
            Some(())
        })
        .await;
        info!("park feed update completed with {} parks", records.len());
        Ok(records)
    }

    async fn on_disk<T, F>(&self, op: F) -> Option<T>
    where
        F: FnOnce(&FeedCache) -> Option<T> + Send + 'static,
        T: Send + 'static,
    {
        let cache = self.cache.clone();
        match tokio::task::spawn_blocking(move || op(&cache)).await {
            Ok(value) => value,
            Err(err) => {
                warn!("park cache task failed: {err}");
                None
            }
        }
    }
}

fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
