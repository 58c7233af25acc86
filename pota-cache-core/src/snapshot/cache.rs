use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::Snapshot;
use crate::element::OverpassDocument;

/// Cheap metadata view of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    /// Elements in the current snapshot, zero when none is published.
    pub element_count: usize,
    /// Publication time of the current snapshot.
    pub last_update: Option<DateTime<Utc>>,
    /// Number of successful publishes since start-up.
    pub refresh_count: u64,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Arc<Snapshot>>,
    refresh_count: u64,
}

/// Holder of the current [`Snapshot`].
///
/// The lock guards only an `Option<Arc<Snapshot>>` and a counter; it is held
/// for the pointer swap on publish and the reference clone on read, never
/// across I/O or filtering. When two refreshes race, the later publish wins.
///
/// # Examples
/// ```
/// use pota_cache_core::{OverpassDocument, SnapshotCache};
///
/// let cache = SnapshotCache::new();
/// assert!(cache.read().is_none());
///
/// let status = cache.publish(OverpassDocument::empty());
/// assert_eq!(status.refresh_count, 1);
/// assert!(cache.read().is_some());
/// ```
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slot: RwLock<Slot>,
}

impl SnapshotCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `document` as the current snapshot and bump the refresh count.
    ///
    /// Returns the status as of this publish.
    pub fn publish(&self, document: OverpassDocument) -> CacheStatus {
        let fetched_at = Utc::now();
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let refresh_count = slot.refresh_count + 1;
        let snapshot = Arc::new(Snapshot {
            document,
            fetched_at,
            refresh_count,
        });
        let element_count = snapshot.element_count();
        slot.current = Some(snapshot);
        slot.refresh_count = refresh_count;
        CacheStatus {
            element_count,
            last_update: Some(fetched_at),
            refresh_count,
        }
    }

    /// The current snapshot, or `None` before the first publish.
    #[must_use]
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Element count, last update and refresh count.
    #[must_use]
    pub fn status(&self) -> CacheStatus {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        CacheStatus {
            element_count: slot.current.as_ref().map_or(0, |s| s.element_count()),
            last_update: slot.current.as_ref().map(|s| s.fetched_at),
            refresh_count: slot.refresh_count,
        }
    }
}
