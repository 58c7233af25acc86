use super::*;
use crate::element::{Bounds, GeometryPoint, Member, POTA_TAG, Tags};
use crate::test_support::pota_tags;
use rstest::{fixture, rstest};

fn square_bounds(min: f64, max: f64) -> Bounds {
    Bounds {
        minlat: min,
        minlon: min,
        maxlat: max,
        maxlon: max,
    }
}

#[fixture]
fn relation_with_geometry() -> Element {
    Element::relation(pota_tags("US-0042"))
        .with_id(42)
        .with_geometry(vec![GeometryPoint::new(40.0, -118.0)])
        .with_members(vec![
            Member::new(ElementKind::Way, 1),
            Member::new(ElementKind::Node, 2),
            Member::new(ElementKind::Way, 3),
        ])
}

#[rstest]
fn relation_geometry_match_propagates_to_way_members(relation_with_geometry: Element) {
    let document = OverpassDocument::from_elements(vec![relation_with_geometry]);
    let bbox = BoundingBox::new(39.0, -119.0, 41.0, -117.0);

    let filtered = filter_document(&document, &bbox);

    assert_eq!(filtered.elements.len(), 1);
    let members = filtered.elements[0]
        .members
        .as_ref()
        .expect("members should survive filtering");
    let tagged: Vec<_> = members
        .iter()
        .map(|member| member.tags.get(POTA_TAG).map(String::as_str))
        .collect();
    assert_eq!(tagged, vec![Some("US-0042"), None, Some("US-0042")]);
}

#[rstest]
fn filtering_leaves_the_source_document_untouched(relation_with_geometry: Element) {
    let document = OverpassDocument::from_elements(vec![relation_with_geometry]);
    let before = document.clone();

    let _filtered = filter_document(&document, &BoundingBox::new(39.0, -119.0, 41.0, -117.0));

    assert_eq!(document, before);
}

#[rstest]
fn way_vertices_receive_default_when_parent_untagged() {
    let way = Element::way(Tags::from([("leisure".to_owned(), "park".to_owned())]))
        .with_geometry(vec![GeometryPoint::new(1.0, 1.0), GeometryPoint::new(5.0, 5.0)]);
    let document = OverpassDocument::from_elements(vec![way]);

    let filtered = filter_document(&document, &BoundingBox::new(0.0, 0.0, 2.0, 2.0));

    let geometry = filtered.elements[0]
        .geometry
        .as_ref()
        .expect("geometry should survive filtering");
    assert!(
        geometry
            .iter()
            .all(|point| point.tags.get(POTA_TAG).map(String::as_str) == Some(PROPAGATED_DEFAULT))
    );
}

#[rstest]
fn existing_vertex_tags_are_kept() {
    let mut vertex = GeometryPoint::new(1.0, 1.0);
    vertex.tags.insert(POTA_TAG.to_owned(), "US-9999".to_owned());
    vertex.tags.insert("note".to_owned(), "gate".to_owned());
    let way = Element::way(pota_tags("US-0001")).with_geometry(vec![vertex]);
    let document = OverpassDocument::from_elements(vec![way]);

    let filtered = filter_document(&document, &BoundingBox::new(0.0, 0.0, 2.0, 2.0));

    let tags = &filtered.elements[0]
        .geometry
        .as_ref()
        .expect("geometry should survive filtering")[0]
        .tags;
    assert_eq!(tags.get(POTA_TAG).map(String::as_str), Some("US-9999"));
    assert_eq!(tags.get("note").map(String::as_str), Some("gate"));
}

#[rstest]
#[case(square_bounds(10.0, 20.0), BoundingBox::new(15.0, 15.0, 25.0, 25.0), true)]
#[case(square_bounds(10.0, 20.0), BoundingBox::new(0.0, 0.0, 10.0, 10.0), true)]
#[case(square_bounds(10.0, 20.0), BoundingBox::new(21.0, 21.0, 30.0, 30.0), false)]
#[case(square_bounds(10.0, 20.0), BoundingBox::new(12.0, 12.0, 18.0, 18.0), false)]
fn bounds_use_edge_overlap(
    #[case] bounds: Bounds,
    #[case] bbox: BoundingBox,
    #[case] expected: bool,
) {
    let way = Element::way(pota_tags("US-1234")).with_bounds(bounds);
    assert_eq!(matches_bbox(&way, &bbox), expected);
}

#[rstest]
fn bounds_take_precedence_over_geometry() {
    let way = Element::way(pota_tags("US-1234"))
        .with_bounds(square_bounds(50.0, 60.0))
        .with_geometry(vec![GeometryPoint::new(1.0, 1.0)]);
    assert!(!matches_bbox(&way, &BoundingBox::new(0.0, 0.0, 2.0, 2.0)));
}

#[rstest]
fn composites_without_bounds_or_geometry_never_match() {
    let relation = Element::relation(pota_tags("US-1234"));
    assert!(!matches_bbox(
        &relation,
        &BoundingBox::new(-90.0, -180.0, 90.0, 180.0)
    ));
}

#[rstest]
fn nodes_without_coordinates_never_match() {
    let mut node = Element::node(0.0, 0.0, pota_tags("US-1234"));
    node.lat = None;
    assert!(!matches_bbox(
        &node,
        &BoundingBox::new(-90.0, -180.0, 90.0, 180.0)
    ));
}

#[rstest]
fn result_is_stamped_with_cache_generator() {
    let mut document = OverpassDocument::from_elements(Vec::new());
    document.generator = "Overpass API 0.7.62".to_owned();

    let filtered = filter_document(&document, &BoundingBox::new(0.0, 0.0, 1.0, 1.0));

    assert_eq!(filtered.generator, crate::element::CACHE_GENERATOR);
    assert!((filtered.version - crate::element::OVERPASS_VERSION).abs() < f64::EPSILON);
}
