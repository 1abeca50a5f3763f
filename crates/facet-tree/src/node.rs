//! The facet tree node type.
//!
//! A [`FacetNode`] is one node of the prefix tree a widget renders as nested
//! facet checkboxes. Trees are rebuilt from scratch on every relevant state
//! update, so nodes carry no identity beyond their path.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{flat::FlatFacetEntry, path};

/// A node in a facet prefix tree.
///
/// Every non-root node's `path` equals its parent's path joined with its
/// segment; every ancestor of an inserted path exists as a node. A node's
/// `count` reflects only the most recently merged-in value, never a sum
/// across merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetNode {
    /// Absolute path rooted at `/`, e.g. `/news/local`. The root's path is `/`.
    pub path: String,
    /// Matching-document count as last reported, or 0 if synthesized.
    pub count: u64,
    /// Child nodes keyed by segment name. Segment uniqueness per parent is
    /// enforced by the map itself.
    pub children: BTreeMap<String, FacetNode>,
}

impl FacetNode {
    /// Creates an empty tree: the root node with count 0 and no children.
    pub fn root() -> Self {
        Self::new(path::ROOT, 0)
    }

    /// Creates a node with the given path and count and no children.
    pub fn new(path: impl Into<String>, count: u64) -> Self {
        Self {
            path: path.into(),
            count,
            children: BTreeMap::new(),
        }
    }

    /// Returns true if this node has no children.
    ///
    /// On the root this means the whole tree is empty.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Looks up the node at an absolute path, starting from this node.
    ///
    /// The path is interpreted relative to the tree root, so this is normally
    /// called on the root node. Returns `None` if any segment is missing.
    pub fn node_at(&self, path: &str) -> Option<&Self> {
        let mut current = self;
        for segment in path::segments(path) {
            current = current.children.get(segment)?;
        }
        Some(current)
    }

    /// Returns the count at an absolute path, or `None` if the path is absent.
    pub fn count_at(&self, path: &str) -> Option<u64> {
        self.node_at(path).map(|node| node.count)
    }

    /// Returns the total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(Self::node_count)
            .sum::<usize>()
    }

    /// Flattens this tree back into wire entries, pre-order, root skipped.
    ///
    /// Feeding the result back through the builder reproduces the tree, which
    /// is what makes build/flatten round-trips testable.
    pub fn to_flat(&self) -> Vec<FlatFacetEntry> {
        let mut out = Vec::new();
        self.collect_flat(&mut out);
        out
    }

    /// Pre-order entry collection, skipping the root node itself.
    fn collect_flat(&self, out: &mut Vec<FlatFacetEntry>) {
        if self.path != path::ROOT {
            out.push(FlatFacetEntry::new(&self.path, self.count));
        }
        for child in self.children.values() {
            child.collect_flat(out);
        }
    }
}
