//! Element builders shared by unit and behaviour tests.

use crate::element::{Element, NAME_TAG, POTA_TAG, Tags};

/// Tags holding only a POTA reference.
#[must_use]
pub fn pota_tags(reference: &str) -> Tags {
    Tags::from([(POTA_TAG.to_owned(), reference.to_owned())])
}

/// Tags holding a POTA reference and a name.
#[must_use]
pub fn named_pota_tags(reference: &str, name: &str) -> Tags {
    let mut tags = pota_tags(reference);
    tags.insert(NAME_TAG.to_owned(), name.to_owned());
    tags
}

/// A node with an upstream identifier.
#[must_use]
pub fn pota_node(id: i64, lat: f64, lon: f64, tags: Tags) -> Element {
    Element::node(lat, lon, tags).with_id(id)
}
