//! Reconcile OpenStreetMap elements with the POTA park feed.
//!
//! The feed is ground truth for which parks exist:
//! - OSM elements whose reference is absent from the feed are pruned;
//! - surviving elements take the feed's name when it has one;
//! - parks the OSM data lacks are injected as synthetic nodes.
//!
//! An empty feed is treated as "feed unavailable" and the OSM document passes
//! through unchanged rather than emptying the cache.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::element::{Element, ElementKind, NAME_TAG, OverpassDocument, POTA_TAG, Tags};
use crate::park::ParkRecord;

/// Tag marking whether a synthetic park node is active.
pub const ACTIVE_TAG: &str = "pota:active";

/// Tag marking a park that exists in the feed but not in OpenStreetMap.
pub const UNMAPPED_TAG: &str = "unmapped_osm";

/// Merge one OSM snapshot with one park feed snapshot.
///
/// Within the OSM input only the first node per reference is kept, so the
/// result never holds two nodes with the same reference. Ways and relations
/// sharing a reference are all kept. Synthetic nodes are appended in feed
/// order after the retained OSM elements.
///
/// # Examples
/// ```
/// use pota_cache_core::{OverpassDocument, ParkRecord, merge};
///
/// let parks = vec![ParkRecord::new("US-5678", "Test Park", true, 45.0, -122.0)];
/// let merged = merge(OverpassDocument::empty(), &parks);
///
/// assert_eq!(merged.elements.len(), 1);
/// assert_eq!(merged.elements[0].position(), Some((45.0, -122.0)));
/// ```
#[must_use]
pub fn merge(osm: OverpassDocument, parks: &[ParkRecord]) -> OverpassDocument {
    if parks.is_empty() {
        debug!("park feed empty; passing OSM document through unchanged");
        return osm;
    }

    let names: HashMap<&str, &str> = parks
        .iter()
        .filter(|park| !park.name.is_empty())
        .map(|park| (park.reference.as_str(), park.name.as_str()))
        .collect();
    let known: HashSet<&str> = parks.iter().map(|park| park.reference.as_str()).collect();

    let mut seen_nodes: HashSet<String> = HashSet::new();
    let mut elements: Vec<Element> = Vec::with_capacity(osm.elements.len() + parks.len());
    let mut dropped = 0_usize;

    for mut element in osm.elements {
        let Some(reference) = element.pota_reference().map(str::to_owned) else {
            dropped += 1;
            continue;
        };
        if !known.contains(reference.as_str()) {
            dropped += 1;
            continue;
        }
        if element.kind == ElementKind::Node && !seen_nodes.insert(reference.clone()) {
            dropped += 1;
            continue;
        }
        if let Some(name) = names.get(reference.as_str()) {
            element
                .tags
                .insert(NAME_TAG.to_owned(), (*name).to_owned());
        }
        elements.push(element);
    }

    let mapped: HashSet<String> = elements
        .iter()
        .filter_map(Element::pota_reference)
        .map(str::to_owned)
        .collect();
    let retained = elements.len();

    let mut injected: HashSet<&str> = HashSet::new();
    for park in parks {
        if mapped.contains(park.reference.as_str()) || !injected.insert(park.reference.as_str()) {
            continue;
        }
        elements.push(synthetic_node(park));
    }

    debug!(
        "merged {retained} OSM elements ({dropped} dropped) with {} synthetic parks",
        elements.len() - retained
    );
    OverpassDocument::from_elements(elements)
}

/// Build the node injected for a park missing from OpenStreetMap.
#[must_use]
pub fn synthetic_node(park: &ParkRecord) -> Element {
    let mut tags = Tags::from([
        (POTA_TAG.to_owned(), park.reference.clone()),
        (ACTIVE_TAG.to_owned(), if park.active { "1" } else { "0" }.to_owned()),
        (UNMAPPED_TAG.to_owned(), "true".to_owned()),
    ]);
    if !park.name.is_empty() {
        tags.insert(NAME_TAG.to_owned(), park.name.clone());
    }
    Element::node(park.lat, park.lon, tags)
}
