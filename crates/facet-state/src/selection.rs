//! Checked-facet tracking.
//!
//! The tracker owns the set of currently checked facet paths for one facet
//! field. It persists across responses and is mutated only by direct user
//! interaction, never by the aggregation logic. Unchecking a path cascades to
//! its descendants using segment-boundary path-prefix comparison, so
//! unchecking `/news` clears `/news/local` but leaves `/newsletter` alone.

use std::collections::BTreeSet;

use facet_tree::path;

/// The set of currently checked facet paths for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    /// Checked paths, canonical form. Absence means unchecked.
    selected: BTreeSet<String>,
}

impl SelectionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the checked state of `facet_path`.
    ///
    /// Checking adds the path. Unchecking removes it together with every
    /// checked descendant. Returns true if the path is checked afterwards.
    pub fn toggle(&mut self, facet_path: &str) -> bool {
        let canonical = path::normalize(facet_path);
        if self.selected.contains(&canonical) {
            self.selected
                .retain(|p| !path::is_path_prefix(&canonical, p));
            false
        } else {
            self.selected.insert(canonical);
            true
        }
    }

    /// Returns true if `facet_path` is checked.
    pub fn is_selected(&self, facet_path: &str) -> bool {
        self.selected.contains(&path::normalize(facet_path))
    }

    /// Returns true if anything at all is checked.
    pub fn is_any_selected(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Returns true if a strict descendant of `facet_path` is checked.
    ///
    /// The rendering layer uses this for indeterminate checkbox state: a node
    /// that is not itself checked but has a checked descendant.
    pub fn has_selected_descendant(&self, facet_path: &str) -> bool {
        let canonical = path::normalize(facet_path);
        self.selected
            .iter()
            .any(|p| p != &canonical && path::is_path_prefix(&canonical, p))
    }

    /// Returns every checked path in sorted order.
    pub fn selected_paths(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// Returns the checked paths the outgoing query should filter on.
    ///
    /// A checked path that is an ancestor of another checked path is dropped,
    /// so only the most specific selections are sent: with `/news` and
    /// `/news/local` both checked, only `/news/local` goes out.
    pub fn outgoing_filter_paths(&self) -> Vec<String> {
        self.selected
            .iter()
            .filter(|candidate| {
                !self
                    .selected
                    .iter()
                    .any(|other| *other != **candidate && path::is_path_prefix(candidate, other))
            })
            .cloned()
            .collect()
    }

    /// Unchecks everything.
    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
