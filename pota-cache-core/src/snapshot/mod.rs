//! Published snapshots and the cache that holds the current one.
//!
//! [`SnapshotCache`] is the only state shared between the refresh loop and
//! request handlers. A snapshot is built completely outside the cache and
//! installed with a single `Arc` swap, so readers observe either the old
//! snapshot or the new one, never a partial write.

mod cache;

use chrono::{DateTime, Utc};

use crate::element::OverpassDocument;

pub use cache::{CacheStatus, SnapshotCache};

/// One immutable, fully formed cached dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The merged Overpass document.
    pub document: OverpassDocument,
    /// When the snapshot was published.
    pub fetched_at: DateTime<Utc>,
    /// Position of this snapshot in the process-wide publish sequence.
    pub refresh_count: u64,
}

impl Snapshot {
    /// Number of elements in the snapshot.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.document.elements.len()
    }
}
