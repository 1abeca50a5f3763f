//! Facet tree construction from wire entries.
//!
//! The builder turns an entry forest into a complete prefix tree rooted at
//! `/`. Missing ancestors are synthesized, exclusion rules are applied before
//! insertion, and no ordering is assumed from the source: parents may arrive
//! after their children.

use crate::{FacetNode, FlatFacetEntry, flat, path};

/// An exclusion rule applied by the builder before insertion.
///
/// Rules come from configuration as plain strings; a leading slash selects
/// subtree exclusion, a bare name selects segment exclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludeRule {
    /// Drops any entry at this path or nested under it (segment-boundary-safe).
    Subtree(String),
    /// Drops any entry with a segment equal to this name.
    Segment(String),
}

impl ExcludeRule {
    /// Parses a rule string: a leading `/` means subtree, otherwise segment.
    pub fn parse(rule: &str) -> Self {
        if rule.starts_with('/') {
            Self::Subtree(path::normalize(rule))
        } else {
            Self::Segment(rule.to_string())
        }
    }

    /// Returns true if an entry at `entry_path` should be dropped.
    fn excludes(&self, entry_path: &str) -> bool {
        match self {
            Self::Subtree(prefix) => path::is_path_prefix(prefix, entry_path),
            Self::Segment(name) => path::segments(entry_path).any(|s| s == name),
        }
    }
}

/// Builds a facet prefix tree from an entry forest.
///
/// The forest is flattened first (nesting depth is irrelevant, only `path`
/// determines tree position), excluded entries are dropped, and each surviving
/// `(path, count)` pair is inserted from the root down. Intermediate nodes
/// created along the way start with the current pair's count; when the pair's
/// own path is later reported explicitly, its count is overwritten. Duplicate
/// paths are last-write-wins, never summed. The root's count is always 0.
///
/// A rule referencing a path or segment that never occurs is a no-op.
pub fn build(entries: &[FlatFacetEntry], exclude: &[ExcludeRule]) -> FacetNode {
    let mut root = FacetNode::root();
    for (entry_path, count) in flat::flatten(entries) {
        if exclude.iter().any(|rule| rule.excludes(&entry_path)) {
            continue;
        }
        insert(&mut root, &entry_path, count);
    }
    root
}

/// Inserts one `(path, count)` pair, creating missing intermediates.
fn insert(root: &mut FacetNode, entry_path: &str, count: u64) {
    let mut current = root;
    for segment in path::segments(entry_path) {
        let child_path = path::join(&current.path, segment);
        current = current
            .children
            .entry(segment.to_string())
            .or_insert_with(|| FacetNode::new(child_path, count));
    }
    // The node matching the full path gets the pair's count definitively.
    current.count = count;
}
