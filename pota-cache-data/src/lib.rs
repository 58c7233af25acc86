//! Upstream adapters for the POTA Overpass cache.
//!
//! Responsibilities:
//! - Fetch every POTA-tagged element from an Overpass endpoint.
//! - Fetch and normalise the POTA park CSV feed.
//! - Keep a local copy of the park feed with its own freshness window.
//!
//! Boundaries:
//! - Do not encode merge or filter rules (live in `pota-cache-core`).
//! - Keep blocking disk I/O off the async executor.
//!
//! Invariants:
//! - Every HTTP request is bounded by connect and request timeouts.
//! - No global mutable state.

#![forbid(unsafe_code)]

mod error;
mod http;
pub mod overpass;
pub mod park_feed;

#[doc(hidden)]
pub mod test_support;

pub use error::{FailureClass, ParkFeedError, UpstreamError};
pub use http::{ClientBuildError, DEFAULT_USER_AGENT, HttpSourceConfig};
pub use overpass::{DEFAULT_OVERPASS_URL, HttpOverpassSource, OverpassSource, POTA_QUERY};
pub use park_feed::{
    DEFAULT_FEED_MAX_AGE, DEFAULT_PARK_FEED_URL, FeedCache, HttpParkFeedSource, ParkFeedClient,
    ParkFeedSource, parse_park_csv,
};
