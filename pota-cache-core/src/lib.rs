//! Core domain logic for the POTA Overpass cache.
//!
//! Responsibilities:
//! - Model Overpass JSON elements and POTA park records.
//! - Merge the park feed into OpenStreetMap elements.
//! - Filter a cached snapshot by bounding box, propagating POTA tags onto
//!   the sub-elements of matching ways and relations.
//! - Hold the current snapshot behind an atomic swap.
//!
//! Boundaries:
//! - No network or disk I/O; upstream adapters live in `pota-cache-data`.
//!
//! Invariants:
//! - A published snapshot is never mutated; filtering works on copies.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod bbox;
pub mod element;
pub mod merge;
pub mod park;
pub mod query;
pub mod snapshot;

#[doc(hidden)]
pub mod test_support;

pub use bbox::{BBoxParseError, BoundingBox, parse_bbox};
pub use element::{
    Bounds, CACHE_GENERATOR, Element, ElementKind, GeometryPoint, Member, NAME_TAG,
    OVERPASS_VERSION, OverpassDocument, POTA_TAG, Tags,
};
pub use merge::{ACTIVE_TAG, UNMAPPED_TAG, merge};
pub use park::ParkRecord;
pub use query::{filter_document, matches_bbox};
pub use snapshot::{CacheStatus, Snapshot, SnapshotCache};
