//! Overpass JSON element model.
//!
//! The types mirror the shape emitted by the Overpass API for `out geom`
//! queries. Keys this crate does not interpret (`nodes`, `timestamp`, member
//! `geometry`, …) are captured in `extra` maps and re-emitted verbatim, so a
//! document survives a decode/encode cycle without losing upstream detail.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tag key carrying a Parks on the Air reference code.
pub const POTA_TAG: &str = "communication:amateur_radio:pota";

/// Tag key holding an element's display name.
pub const NAME_TAG: &str = "name";

/// Schema version advertised by Overpass JSON documents.
pub const OVERPASS_VERSION: f64 = 0.6;

/// Generator label stamped on documents produced by this cache.
pub const CACHE_GENERATOR: &str = "Overpass API POTA Cache";

/// OpenStreetMap-style key/value tags.
///
/// A sorted map keeps serialised output stable across runs.
pub type Tags = BTreeMap<String, String>;

/// The three OpenStreetMap element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A single point.
    Node,
    /// An ordered sequence of nodes.
    Way,
    /// A grouping of other elements.
    Relation,
}

/// Axis-aligned rectangle attached to ways and relations by `out geom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Southern edge in decimal degrees.
    pub minlat: f64,
    /// Western edge in decimal degrees.
    pub minlon: f64,
    /// Northern edge in decimal degrees.
    pub maxlat: f64,
    /// Eastern edge in decimal degrees.
    pub maxlon: f64,
}

/// A vertex of a way or relation geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryPoint {
    /// Latitude in decimal degrees (WGS84).
    pub lat: f64,
    /// Longitude in decimal degrees (WGS84).
    pub lon: f64,
    /// Tags attached to the vertex, typically empty upstream.
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl GeometryPoint {
    /// Construct an untagged vertex.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            tags: Tags::new(),
        }
    }
}

/// A relation member reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Kind of the referenced element.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Identifier of the referenced element.
    #[serde(rename = "ref")]
    pub reference: i64,
    /// Role of the member within the relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Tags attached to the member entry.
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    /// Upstream keys not interpreted by the cache.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    /// Construct an untagged member without a role.
    #[must_use]
    pub fn new(kind: ElementKind, reference: i64) -> Self {
        Self {
            kind,
            reference,
            role: None,
            tags: Tags::new(),
            extra: Map::new(),
        }
    }
}

/// A node, way, or relation as produced by the Overpass API.
///
/// Kind-specific fields are optional: nodes carry `lat`/`lon`, ways and
/// relations may carry `bounds` and `geometry`, relations carry `members`.
///
/// # Examples
/// ```
/// use pota_cache_core::{Element, ElementKind, POTA_TAG};
///
/// let json = r#"{"type":"node","id":7,"lat":45.0,"lon":-122.0,
///     "tags":{"communication:amateur_radio:pota":"US-0001"}}"#;
/// let element: Element = serde_json::from_str(json).expect("valid element");
/// assert_eq!(element.kind, ElementKind::Node);
/// assert_eq!(element.pota_reference(), Some("US-0001"));
/// assert_eq!(element.tags.get(POTA_TAG).map(String::as_str), Some("US-0001"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element kind, serialised as Overpass `type`.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Upstream identifier; absent on synthetic elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Node latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Node longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// Way or relation bounding rectangle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Way or relation vertices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<GeometryPoint>>,
    /// Relation members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,
    /// Element tags.
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    /// Upstream keys not interpreted by the cache.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Element {
    fn bare(kind: ElementKind, tags: Tags) -> Self {
        Self {
            kind,
            id: None,
            lat: None,
            lon: None,
            bounds: None,
            geometry: None,
            members: None,
            tags,
            extra: Map::new(),
        }
    }

    /// Construct a node at the given coordinate.
    #[must_use]
    pub fn node(lat: f64, lon: f64, tags: Tags) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            ..Self::bare(ElementKind::Node, tags)
        }
    }

    /// Construct a way without geometry; attach `bounds` or `geometry` as needed.
    #[must_use]
    pub fn way(tags: Tags) -> Self {
        Self::bare(ElementKind::Way, tags)
    }

    /// Construct a relation without members or geometry.
    #[must_use]
    pub fn relation(tags: Tags) -> Self {
        Self::bare(ElementKind::Relation, tags)
    }

    /// Set the upstream identifier.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Attach a bounding rectangle.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Attach vertices.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Vec<GeometryPoint>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Attach relation members.
    #[must_use]
    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = Some(members);
        self
    }

    /// The element's POTA reference, if it carries a non-empty one.
    #[must_use]
    pub fn pota_reference(&self) -> Option<&str> {
        self.tags
            .get(POTA_TAG)
            .map(String::as_str)
            .filter(|reference| !reference.trim().is_empty())
    }

    /// The node coordinate as `(lat, lon)`, when both are present.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}

/// An Overpass JSON response body: `{version, generator, elements}`.
///
/// Missing keys take permissive defaults so partial upstream payloads still
/// decode; a missing `elements` array is an empty document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassDocument {
    /// Schema version, normally `0.6`.
    #[serde(default = "default_version")]
    pub version: f64,
    /// Producer label.
    #[serde(default)]
    pub generator: String,
    /// Elements in upstream order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

const fn default_version() -> f64 {
    OVERPASS_VERSION
}

impl OverpassDocument {
    /// Wrap elements in a document stamped with the cache's generator label.
    #[must_use]
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            version: OVERPASS_VERSION,
            generator: CACHE_GENERATOR.to_owned(),
            elements,
        }
    }

    /// A document with no elements.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_elements(Vec::new())
    }
}

impl Default for OverpassDocument {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_elements_decode_as_empty() {
        let document: OverpassDocument =
            serde_json::from_str(r#"{"version":0.6,"generator":"Overpass API"}"#)
                .expect("document should decode");
        assert!(document.elements.is_empty());
        assert_eq!(document.generator, "Overpass API");
    }

    #[rstest]
    fn preserves_unknown_keys() {
        let json = r#"{"type":"way","id":12,"nodes":[1,2,3],
            "bounds":{"minlat":1.0,"minlon":2.0,"maxlat":3.0,"maxlon":4.0},
            "geometry":[{"lat":1.0,"lon":2.0}],
            "tags":{"leisure":"park"}}"#;
        let element: Element = serde_json::from_str(json).expect("element should decode");
        assert_eq!(element.kind, ElementKind::Way);
        assert!(element.extra.contains_key("nodes"));

        let encoded = serde_json::to_value(&element).expect("element should encode");
        assert_eq!(encoded["nodes"], serde_json::json!([1, 2, 3]));
        assert!(encoded["geometry"][0].get("tags").is_none());
    }

    #[rstest]
    fn relation_members_keep_role_and_ref() {
        let json = r#"{"type":"relation","id":5,"members":[
            {"type":"way","ref":99,"role":"outer","geometry":[{"lat":1.0,"lon":1.0}]}]}"#;
        let element: Element = serde_json::from_str(json).expect("relation should decode");
        let members = element.members.expect("members present");
        assert_eq!(members[0].kind, ElementKind::Way);
        assert_eq!(members[0].reference, 99);
        assert_eq!(members[0].role.as_deref(), Some("outer"));
        assert!(members[0].extra.contains_key("geometry"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_references_are_ignored(#[case] value: &str) {
        let element = Element::node(
            0.0,
            0.0,
            Tags::from([(POTA_TAG.to_owned(), value.to_owned())]),
        );
        assert_eq!(element.pota_reference(), None);
    }
}
