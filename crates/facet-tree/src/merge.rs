//! Facet tree merging.
//!
//! Merging carries facet state across requests: the accumulated tree from
//! earlier responses is combined with the tree built from the latest one. The
//! merge is a recursive union in which the incoming side's counts win at every
//! shared path, so stale counts are refreshed wherever the latest response
//! still reports a path, while branches only one side knows about survive.
//!
//! This is deliberately a separate step from building (which grafts ancestors
//! and applies exclusions) and from selection reconciliation (which the
//! controller layers on top with the opposite override direction).

use crate::FacetNode;

/// Merges two facet trees into a new tree.
///
/// Pure: neither input is mutated. For every path present in both trees the
/// result takes `incoming`'s count; paths present in only one tree are kept
/// as-is. The root's count stays 0.
pub fn merge(base: &FacetNode, incoming: &FacetNode) -> FacetNode {
    let mut result = base.clone();
    merge_children(&mut result, incoming);
    result
}

/// Recursively unions `incoming`'s children into `result`.
fn merge_children(result: &mut FacetNode, incoming: &FacetNode) {
    for (segment, incoming_child) in &incoming.children {
        match result.children.get_mut(segment) {
            Some(existing) => {
                existing.count = incoming_child.count;
                merge_children(existing, incoming_child);
            }
            None => {
                result
                    .children
                    .insert(segment.clone(), incoming_child.clone());
            }
        }
    }
}
