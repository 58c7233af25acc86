//! On-disk copy of the last normalised park feed.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeDelta, Utc};
use log::warn;
use pota_cache_core::ParkRecord;

const RECORDS_FILE: &str = "pota_parks.json";
const LAST_FETCH_FILE: &str = "last_fetch_time.txt";

/// Directory holding the cached park list and its fetch timestamp.
///
/// Every method is blocking and reports problems through the log; a missing,
/// unreadable or corrupt file reads as "no cache".
#[derive(Debug, Clone)]
pub struct FeedCache {
    dir: Utf8PathBuf,
}

impl FeedCache {
    /// Cache rooted at `dir`. Nothing is created until the first store.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn records_path(&self) -> Utf8PathBuf {
        self.dir.join(RECORDS_FILE)
    }

    fn timestamp_path(&self) -> Utf8PathBuf {
        self.dir.join(LAST_FETCH_FILE)
    }

    /// When the feed was last fetched successfully.
    #[must_use]
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        let path = self.timestamp_path();
        let text = match pota_cache_fs::read_optional(&path) {
            Ok(text) => text?,
            Err(err) => {
                warn!("failed to read {path}: {err}");
                return None;
            }
        };
        match DateTime::parse_from_rfc3339(text.trim()) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(err) => {
                warn!("ignoring unparseable fetch time in {path}: {err}");
                None
            }
        }
    }

    /// Whether the last fetch is younger than `max_age` at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
        self.last_fetch()
            .is_some_and(|at| now.signed_duration_since(at) < max_age)
    }

    /// The cached records, if a readable copy exists.
    #[must_use]
    pub fn load(&self) -> Option<Vec<ParkRecord>> {
        let path = self.records_path();
        let text = match pota_cache_fs::read_optional(&path) {
            Ok(text) => text?,
            Err(err) => {
                warn!("failed to read {path}: {err}");
                return None;
            }
        };
        serde_json::from_str(&text)
            .inspect_err(|err| warn!("ignoring corrupt park cache {path}: {err}"))
            .ok()
    }

    /// Persist `records` and mark them fetched at `fetched_at`.
    ///
    /// The timestamp is written after the records, so a failed records write
    /// never makes a stale copy look fresh.
    pub fn store(&self, records: &[ParkRecord], fetched_at: DateTime<Utc>) {
        let records_path = self.records_path();
        let body = match serde_json::to_string(records) {
            Ok(body) => body,
            Err(err) => {
                warn!("failed to serialise park cache: {err}");
                return;
            }
        };
        if let Err(err) = pota_cache_fs::write_replacing(&records_path, &body) {
            warn!("failed to write {records_path}: {err}");
            return;
        }
        let timestamp_path = self.timestamp_path();
        if let Err(err) = pota_cache_fs::write_replacing(&timestamp_path, &fetched_at.to_rfc3339())
        {
            warn!("failed to write {timestamp_path}: {err}");
        }
    }
}
