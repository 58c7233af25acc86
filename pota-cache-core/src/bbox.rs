//! Bounding boxes and the narrow Overpass-QL bounding-box parser.
//!
//! Only one construct is understood: a parenthesised group of four
//! comma-separated decimals in `south, west, north, east` order, as written
//! in clauses such as `nwr["leisure"](35.0,-120.0,36.0,-119.0);`. Every other
//! part of the query text is ignored.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::element::Bounds;

/// A south/west/north/east rectangle in decimal degrees.
///
/// Containment is inclusive on all four edges. No normalisation is applied:
/// a box whose south edge lies north of its north edge contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern edge (minimum latitude).
    pub south: f64,
    /// Western edge (minimum longitude).
    pub west: f64,
    /// Northern edge (maximum latitude).
    pub north: f64,
    /// Eastern edge (maximum longitude).
    pub east: f64,
}

impl BoundingBox {
    /// Construct a box from its edges in Overpass order.
    #[must_use]
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Whether `lat` lies within `[south, north]`.
    #[must_use]
    pub fn contains_lat(&self, lat: f64) -> bool {
        (self.south..=self.north).contains(&lat)
    }

    /// Whether `lon` lies within `[west, east]`.
    #[must_use]
    pub fn contains_lon(&self, lon: f64) -> bool {
        (self.west..=self.east).contains(&lon)
    }

    /// Whether the point lies inside the box, edges included.
    ///
    /// # Examples
    /// ```
    /// use pota_cache_core::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(39.0, -119.0, 41.0, -117.0);
    /// assert!(bbox.contains(40.0, -118.0));
    /// assert!(bbox.contains(41.0, -117.0));
    /// assert!(!bbox.contains(41.5, -118.0));
    /// ```
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.contains_lat(lat) && self.contains_lon(lon)
    }

    /// Approximate overlap test against an element's bounds.
    ///
    /// Matches when either latitude edge of `bounds` falls inside the box and
    /// either longitude edge does too. A box lying strictly inside `bounds`
    /// without any edge of `bounds` crossing it is *not* matched; consumers
    /// rely on this narrower result set, so it is kept as is.
    #[must_use]
    pub fn overlaps_edges_of(&self, bounds: &Bounds) -> bool {
        (self.contains_lat(bounds.minlat) || self.contains_lat(bounds.maxlat))
            && (self.contains_lon(bounds.minlon) || self.contains_lon(bounds.maxlon))
    }
}

/// Reasons a query string yields no bounding box.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BBoxParseError {
    /// The query text was empty or whitespace.
    #[error("query is empty")]
    Empty,
    /// No parenthesised group was present.
    #[error("query has no parenthesised bounding box")]
    MissingGroup,
    /// A group held the wrong number of comma-separated values.
    #[error("bounding box must have 4 values, found {found}")]
    WrongArity {
        /// Number of values in the rejected group.
        found: usize,
    },
    /// A value could not be parsed as a finite decimal.
    #[error("bounding box value {value:?} is not a finite number")]
    InvalidNumber {
        /// The offending text.
        value: String,
    },
}

/// Extract `(south, west, north, east)` from Overpass-QL query text.
///
/// Percent-encoded input is decoded first. Each innermost parenthesised group
/// is tried in order; the first holding exactly four finite decimals wins.
///
/// # Errors
/// Returns [`BBoxParseError`] when no group qualifies. The error describes
/// the last group examined, or [`BBoxParseError::MissingGroup`] when the text
/// has no group at all.
///
/// # Examples
/// ```
/// use pota_cache_core::{BoundingBox, parse_bbox};
///
/// let query = r#"[out:json];(nwr["x"](35.0,-120.0,36.0,-119.0););out geom;"#;
/// let bbox = parse_bbox(query).expect("query holds a bounding box");
/// assert_eq!(bbox, BoundingBox::new(35.0, -120.0, 36.0, -119.0));
///
/// assert!(parse_bbox("not a valid query").is_err());
/// ```
pub fn parse_bbox(query: &str) -> Result<BoundingBox, BBoxParseError> {
    if query.trim().is_empty() {
        return Err(BBoxParseError::Empty);
    }
    let decoded = decode(query);

    let mut last_error = BBoxParseError::MissingGroup;
    for group in innermost_groups(&decoded) {
        match parse_group(group) {
            Ok(bbox) => return Ok(bbox),
            Err(err) => last_error = err,
        }
    }
    Err(last_error)
}

/// Escapes that do not form UTF-8 become U+FFFD.
fn decode(query: &str) -> Cow<'_, str> {
    if !query.contains('%') {
        return Cow::Borrowed(query);
    }
    percent_decode_str(query).decode_utf8_lossy()
}

/// Yield the contents of every `( … )` group that contains no nested `(`.
fn innermost_groups(text: &str) -> impl Iterator<Item = &str> {
    let mut open: Option<usize> = None;
    text.char_indices().filter_map(move |(index, ch)| match ch {
        '(' => {
            open = Some(index);
            None
        }
        ')' => open
            .take()
            .and_then(|start| text.get(start + 1..index)),
        _ => None,
    })
}

fn parse_group(group: &str) -> Result<BoundingBox, BBoxParseError> {
    let parts: Vec<&str> = group.split(',').map(str::trim).collect();
    let [south, west, north, east] = parts.as_slice() else {
        return Err(BBoxParseError::WrongArity { found: parts.len() });
    };
    Ok(BoundingBox::new(
        parse_coordinate(south)?,
        parse_coordinate(west)?,
        parse_coordinate(north)?,
        parse_coordinate(east)?,
    ))
}

fn parse_coordinate(text: &str) -> Result<f64, BBoxParseError> {
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| BBoxParseError::InvalidNumber {
            value: text.to_owned(),
        })
}
