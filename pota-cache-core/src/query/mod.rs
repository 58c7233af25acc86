//! Bounding-box filtering over cached Overpass documents.
//!
//! [`filter_document`] is a pure function: it borrows the cached document,
//! clones only the elements that match, and applies tag propagation to those
//! clones. The cached original is never touched, so a snapshot shared
//! between concurrent readers stays identical for every one of them.

mod propagate;

use crate::bbox::BoundingBox;
use crate::element::{Element, ElementKind, OverpassDocument};

pub use propagate::{PROPAGATED_DEFAULT, propagate_pota_tag};

/// Return the subset of `document` that lies within `bbox`.
///
/// Inclusion rules per element kind:
/// - nodes: the coordinate lies within `bbox`, edges included;
/// - ways and relations with `bounds`: [`BoundingBox::overlaps_edges_of`];
/// - ways and relations without `bounds`: any geometry vertex lies within
///   `bbox`.
///
/// Included ways and relations have the POTA tag propagated onto their
/// sub-elements. The result carries the cache's version and generator label.
///
/// # Examples
/// ```
/// use pota_cache_core::{BoundingBox, Element, OverpassDocument, Tags, filter_document};
///
/// let inside = Element::node(45.0, -122.0, Tags::new());
/// let outside = Element::node(10.0, 10.0, Tags::new());
/// let document = OverpassDocument::from_elements(vec![inside.clone(), outside]);
///
/// let filtered = filter_document(&document, &BoundingBox::new(44.0, -123.0, 46.0, -121.0));
/// assert_eq!(filtered.elements, vec![inside]);
/// ```
#[must_use]
pub fn filter_document(document: &OverpassDocument, bbox: &BoundingBox) -> OverpassDocument {
    let elements = document
        .elements
        .iter()
        .filter(|element| matches_bbox(element, bbox))
        .map(|element| {
            let mut copy = element.clone();
            propagate_pota_tag(&mut copy);
            copy
        })
        .collect();
    OverpassDocument::from_elements(elements)
}

/// Whether a single element falls within `bbox`.
#[must_use]
pub fn matches_bbox(element: &Element, bbox: &BoundingBox) -> bool {
    match element.kind {
        ElementKind::Node => element
            .position()
            .is_some_and(|(lat, lon)| bbox.contains(lat, lon)),
        ElementKind::Way | ElementKind::Relation => composite_matches(element, bbox),
    }
}

fn composite_matches(element: &Element, bbox: &BoundingBox) -> bool {
    if let Some(bounds) = &element.bounds {
        return bbox.overlaps_edges_of(bounds);
    }
    element.geometry.as_deref().is_some_and(|points| {
        points
            .iter()
            .any(|point| bbox.contains(point.lat, point.lon))
    })
}

#[cfg(test)]
mod tests;
