//! Request transition classification.
//!
//! On every landed response the controller must decide why the underlying
//! request changed since the last one it observed, because each cause demands
//! a different accumulation policy for the new facet counts. The classifier
//! is a small state machine: its only state is the last-seen scalars of the
//! previous request, and it is re-entered on every observation.

use facet_state::{SearchMode, SearchRequest};

/// Why the search request changed since the previous observation.
///
/// Exactly one signal is produced per observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSignal {
    /// The search term became empty. The accumulated tree is discarded.
    TermCleared,
    /// A different term with no facets checked. The tree is replaced.
    NewTerm,
    /// A different term while facets are checked. Supplemental counts are
    /// preferred so checked siblings stay visible.
    NewTermWithActiveFacets,
    /// A range filter changed.
    RangeChanged,
    /// A facet filter changed. Counts accumulate incrementally.
    FacetChanged,
    /// The sort field changed. Counts accumulate incrementally.
    SortChanged,
    /// The exact/fuzzy mode changed.
    ModeChanged,
    /// Nothing recognizable changed. The tree is left untouched.
    Unclassified,
}

/// The last-seen request scalars the classifier compares against.
#[derive(Debug, Clone)]
struct LastSeen {
    /// Previous search term.
    term: String,
    /// Previous canonical range-filter serialization.
    range_key: String,
    /// Previous canonical facet-filter serialization.
    facet_key: String,
    /// Previous sort field.
    sort_field: Option<String>,
    /// Previous match mode.
    mode: SearchMode,
}

impl LastSeen {
    /// Captures the scalars of a request.
    fn capture(request: &SearchRequest) -> Self {
        Self {
            term: request.term.clone(),
            range_key: request.range_key(),
            facet_key: request.facet_key(),
            sort_field: request.sort_field.clone(),
            mode: request.mode,
        }
    }
}

/// Classifies request transitions from one observation to the next.
///
/// `None` last-seen state marks the very first observation, so an initial
/// pre-seeded query is a fresh term rather than a cleared one, and an
/// initially empty widget classifies as [`TransitionSignal::Unclassified`].
#[derive(Debug, Default)]
pub struct TransitionClassifier {
    /// Scalars of the previously observed request, if any.
    last: Option<LastSeen>,
}

impl TransitionClassifier {
    /// Creates a classifier that has observed nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies the transition to `request` and records it as last seen.
    ///
    /// `any_selected` is whether any facet path is currently checked; it only
    /// disambiguates the two new-term signals.
    pub fn classify(&mut self, request: &SearchRequest, any_selected: bool) -> TransitionSignal {
        let signal = self.classify_only(request, any_selected);
        self.last = Some(LastSeen::capture(request));
        signal
    }

    /// The precedence rules, evaluated against the stored last-seen scalars.
    fn classify_only(&self, request: &SearchRequest, any_selected: bool) -> TransitionSignal {
        let Some(last) = &self.last else {
            // First observation: a pre-seeded term is a fresh query.
            if request.term.is_empty() {
                return TransitionSignal::Unclassified;
            }
            return if any_selected {
                TransitionSignal::NewTermWithActiveFacets
            } else {
                TransitionSignal::NewTerm
            };
        };

        if request.term.is_empty() {
            TransitionSignal::TermCleared
        } else if request.term != last.term {
            if any_selected {
                TransitionSignal::NewTermWithActiveFacets
            } else {
                TransitionSignal::NewTerm
            }
        } else if request.range_key() != last.range_key {
            TransitionSignal::RangeChanged
        } else if request.facet_key() != last.facet_key {
            TransitionSignal::FacetChanged
        } else if request.sort_field != last.sort_field {
            TransitionSignal::SortChanged
        } else if request.mode != last.mode {
            TransitionSignal::ModeChanged
        } else {
            TransitionSignal::Unclassified
        }
    }
}
