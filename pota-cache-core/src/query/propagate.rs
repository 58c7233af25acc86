//! Tag propagation onto the sub-elements of ways and relations.

use crate::element::{Element, ElementKind, POTA_TAG};

/// Value propagated when the parent carries no POTA reference.
pub const PROPAGATED_DEFAULT: &str = "yes";

/// Copy the parent's POTA reference onto its sub-elements.
///
/// Ways receive the tag on each geometry vertex; relations receive it on
/// each member of kind `way`. Sub-elements that already carry the key keep
/// their value. Nodes are left unchanged.
///
/// Callers must pass an owned copy, never an element shared through a
/// published snapshot.
pub fn propagate_pota_tag(element: &mut Element) {
    let value = element
        .tags
        .get(POTA_TAG)
        .cloned()
        .unwrap_or_else(|| PROPAGATED_DEFAULT.to_owned());

    match element.kind {
        ElementKind::Node => {}
        ElementKind::Way => {
            for point in element.geometry.iter_mut().flatten() {
                point
                    .tags
                    .entry(POTA_TAG.to_owned())
                    .or_insert_with(|| value.clone());
            }
        }
        ElementKind::Relation => {
            for member in element
                .members
                .iter_mut()
                .flatten()
                .filter(|member| member.kind == ElementKind::Way)
            {
                member
                    .tags
                    .entry(POTA_TAG.to_owned())
                    .or_insert_with(|| value.clone());
            }
        }
    }
}
