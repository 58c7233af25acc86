//! Facade crate for the POTA Overpass cache.
//!
//! This crate re-exports the domain model, merge and filter logic, and the
//! snapshot cache. The upstream HTTP adapters are exposed behind the
//! `upstream` feature, which is on by default.

#![forbid(unsafe_code)]

pub use pota_cache_core::{
    BBoxParseError, BoundingBox, CacheStatus, Element, ElementKind, OverpassDocument, ParkRecord,
    Snapshot, SnapshotCache, filter_document, merge, parse_bbox,
};

#[cfg(feature = "upstream")]
pub use pota_cache_data::{
    FailureClass, HttpOverpassSource, HttpParkFeedSource, OverpassSource, ParkFeedClient,
    ParkFeedError, ParkFeedSource, UpstreamError,
};
