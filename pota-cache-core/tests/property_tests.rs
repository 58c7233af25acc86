//! Property-based tests for bounding-box filtering and merging.
//!
//! # Invariants tested
//!
//! - **Node containment:** a node is returned iff it lies inside the box.
//! - **Degenerate box:** a zero-area box returns only nodes on that point.
//! - **Idempotence:** re-filtering a filtered document changes nothing.
//! - **Feed pruning:** OSM elements missing from the feed never survive a merge.
//! - **Single injection:** each unmapped park yields exactly one synthetic node.

use std::collections::HashSet;

use pota_cache_core::test_support::{pota_node, pota_tags};
use pota_cache_core::{
    BoundingBox, Element, ElementKind, GeometryPoint, Member, OverpassDocument, ParkRecord,
    UNMAPPED_TAG, filter_document, merge,
};
use proptest::prelude::*;

fn coordinate() -> impl Strategy<Value = (f64, f64)> {
    (-10_i32..=10, -10_i32..=10).prop_map(|(lat, lon)| (f64::from(lat), f64::from(lon)))
}

fn bbox_strategy() -> impl Strategy<Value = BoundingBox> {
    (coordinate(), coordinate()).prop_map(|((lat_a, lon_a), (lat_b, lon_b))| {
        BoundingBox::new(
            lat_a.min(lat_b),
            lon_a.min(lon_b),
            lat_a.max(lat_b),
            lon_a.max(lon_b),
        )
    })
}

fn element_strategy() -> impl Strategy<Value = Element> {
    let node = (any::<i64>(), coordinate())
        .prop_map(|(id, (lat, lon))| pota_node(id, lat, lon, pota_tags("US-0001")));
    let way = prop::collection::vec(coordinate(), 1..4).prop_map(|points| {
        Element::way(pota_tags("US-0002")).with_geometry(
            points
                .into_iter()
                .map(|(lat, lon)| GeometryPoint::new(lat, lon))
                .collect(),
        )
    });
    let relation = coordinate().prop_map(|(lat, lon)| {
        Element::relation(pota_tags("US-0003"))
            .with_geometry(vec![GeometryPoint::new(lat, lon)])
            .with_members(vec![
                Member::new(ElementKind::Way, 1),
                Member::new(ElementKind::Node, 2),
            ])
    });
    prop_oneof![node, way, relation]
}

fn document_strategy() -> impl Strategy<Value = OverpassDocument> {
    prop::collection::vec(element_strategy(), 0..12).prop_map(OverpassDocument::from_elements)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn nodes_are_returned_iff_inside(document in document_strategy(), bbox in bbox_strategy()) {
        let filtered = filter_document(&document, &bbox);
        let expected: Vec<_> = document
            .elements
            .iter()
            .filter(|element| element.kind == ElementKind::Node)
            .filter(|element| {
                element
                    .position()
                    .is_some_and(|(lat, lon)| bbox.contains(lat, lon))
            })
            .collect();
        let returned: Vec<_> = filtered
            .elements
            .iter()
            .filter(|element| element.kind == ElementKind::Node)
            .collect();
        prop_assert_eq!(returned, expected);
    }

    #[test]
    fn degenerate_box_returns_only_nodes_on_the_point(
        document in document_strategy(),
        (lat, lon) in coordinate(),
    ) {
        let bbox = BoundingBox::new(lat, lon, lat, lon);
        let filtered = filter_document(&document, &bbox);
        for element in filtered
            .elements
            .iter()
            .filter(|element| element.kind == ElementKind::Node)
        {
            prop_assert_eq!(element.position(), Some((lat, lon)));
        }
    }

    #[test]
    fn filtering_is_idempotent(document in document_strategy(), bbox in bbox_strategy()) {
        let once = filter_document(&document, &bbox);
        let twice = filter_document(&once, &bbox);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn merge_prunes_and_injects(
        osm_refs in prop::collection::vec(0_u8..8, 0..8),
        feed_refs in prop::collection::hash_set(0_u8..8, 1..8),
    ) {
        let osm = OverpassDocument::from_elements(
            osm_refs
                .iter()
                .enumerate()
                .map(|(index, reference)| {
                    let id = i64::try_from(index).unwrap_or_default();
                    pota_node(id, 0.0, 0.0, pota_tags(&format!("US-{reference}")))
                })
                .collect(),
        );
        let parks: Vec<_> = feed_refs
            .iter()
            .map(|reference| ParkRecord::new(format!("US-{reference}"), "Park", true, 1.0, 1.0))
            .collect();
        let feed: HashSet<String> = parks.iter().map(|park| park.reference.clone()).collect();

        let merged = merge(osm, &parks);

        let mut node_refs = HashSet::new();
        for element in &merged.elements {
            let reference = element.pota_reference().expect("merged elements are tagged");
            prop_assert!(feed.contains(reference));
            prop_assert!(node_refs.insert(reference.to_owned()), "duplicate node {}", reference);
        }
        prop_assert_eq!(node_refs, feed.clone());

        let osm_present: HashSet<String> =
            osm_refs.iter().map(|reference| format!("US-{reference}")).collect();
        let synthetic = merged
            .elements
            .iter()
            .filter(|element| element.tags.contains_key(UNMAPPED_TAG))
            .count();
        prop_assert_eq!(synthetic, feed.difference(&osm_present).count());
    }
}
