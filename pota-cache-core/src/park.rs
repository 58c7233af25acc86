use serde::{Deserialize, Serialize};

/// One normalised row of the POTA park feed.
///
/// Records reach the merger only after ingestion has dropped rows without
/// usable coordinates, so `lat`/`lon` are always finite.
///
/// # Examples
/// ```
/// use pota_cache_core::ParkRecord;
///
/// let park = ParkRecord::new("US-5678", "Test Park", true, 45.0, -122.0);
/// assert_eq!(park.reference, "US-5678");
/// assert!(park.active);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkRecord {
    /// POTA reference code, unique across the feed.
    pub reference: String,
    /// Display name from the feed.
    pub name: String,
    /// Whether the feed marks the park as active.
    pub active: bool,
    /// Latitude in decimal degrees (WGS84).
    pub lat: f64,
    /// Longitude in decimal degrees (WGS84).
    pub lon: f64,
}

impl ParkRecord {
    /// Construct a record from its parts.
    #[must_use]
    pub fn new(
        reference: impl Into<String>,
        name: impl Into<String>,
        active: bool,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            active,
            lat,
            lon,
        }
    }
}
