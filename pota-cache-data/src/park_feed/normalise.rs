//! CSV rows to [`ParkRecord`]s.

use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use pota_cache_core::ParkRecord;

use crate::error::ParkFeedError;

const REFERENCE_COLUMN: usize = 0;
const NAME_COLUMN: usize = 1;
const ACTIVE_COLUMN: usize = 2;
const LAT_COLUMN: usize = 5;
const LON_COLUMN: usize = 6;
const MIN_COLUMNS: usize = 7;

/// Normalise the park CSV.
///
/// The header row is skipped. Rows are dropped when they have fewer than
/// seven columns, an empty reference, or missing or non-numeric coordinates,
/// and, with `active_only`, when the active column is not `1`. Only the first
/// row per reference is kept.
///
/// # Errors
///
/// Returns [`ParkFeedError::Csv`] when the reader cannot decode a record,
/// and [`ParkFeedError::NoUsableRows`] when the header has fewer than seven
/// columns or no row survives. An HTML error page served with a success
/// status ends up here rather than replacing a good cached copy.
///
/// # Examples
/// ```
/// use pota_cache_data::parse_park_csv;
///
/// let csv = "\
/// reference,name,active,entityId,locationDesc,latitude,longitude,grid
/// US-5678,Test Park,1,291,US-OR,45.0,-122.0,CN85
/// US-0000,Closed Park,0,291,US-OR,44.0,-121.0,CN94
/// ";
/// let parks = parse_park_csv(csv, true)?;
/// assert_eq!(parks.len(), 1);
/// assert_eq!(parks[0].name, "Test Park");
/// # Ok::<(), pota_cache_data::ParkFeedError>(())
/// ```
pub fn parse_park_csv(text: &str, active_only: bool) -> Result<Vec<ParkRecord>, ParkFeedError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let columns = reader.headers()?.len();
    if columns < MIN_COLUMNS {
        return Err(ParkFeedError::NoUsableRows {
            reason: format!("header has {columns} columns, expected at least {MIN_COLUMNS}"),
        });
    }

    let mut seen = HashSet::new();
    let mut parks = Vec::new();
    for row in reader.records() {
        let row = row?;
        let Some(park) = normalise_row(&row, active_only) else {
            continue;
        };
        if seen.insert(park.reference.clone()) {
            parks.push(park);
        } else {
            debug!("skipping duplicate park {}", park.reference);
        }
    }
    if parks.is_empty() {
        return Err(ParkFeedError::NoUsableRows {
            reason: "every row was skipped".to_owned(),
        });
    }
    info!("processed {} parks from CSV", parks.len());
    Ok(parks)
}

fn normalise_row(row: &StringRecord, active_only: bool) -> Option<ParkRecord> {
    if row.len() < MIN_COLUMNS {
        debug!("skipping short row with {} columns", row.len());
        return None;
    }
    let reference = row.get(REFERENCE_COLUMN).map(str::trim).unwrap_or_default();
    if reference.is_empty() {
        debug!("skipping row without a reference");
        return None;
    }
    let active = row.get(ACTIVE_COLUMN).map(str::trim) == Some("1");
    if active_only && !active {
        debug!("skipping inactive park {reference}");
        return None;
    }
    let lat_text = row.get(LAT_COLUMN).unwrap_or_default();
    let lon_text = row.get(LON_COLUMN).unwrap_or_default();
    let (Some(lat), Some(lon)) = (coordinate(lat_text), coordinate(lon_text)) else {
        debug!("skipping park {reference} with unusable coordinates: lat={lat_text:?}, lon={lon_text:?}");
        return None;
    };
    let name = row.get(NAME_COLUMN).map(str::trim).unwrap_or_default();
    Some(ParkRecord::new(reference, name, active, lat, lon))
}

fn coordinate(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
