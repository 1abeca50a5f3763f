//! Search request parameters.
//!
//! The request type carries everything the classifier compares between
//! successive observations: the term, range filters, facet filters, sort
//! field, and match mode. Range and facet filters get canonical string
//! serializations (`range_key`, `facet_key`) with stable ordering, used only
//! for change detection, never sent to the backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How the backend matches the search term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Exact term matching.
    #[default]
    Exact,
    /// Fuzzy term matching.
    Fuzzy,
}

/// A numeric or date range filter over one backend field.
///
/// Dates are carried as numeric epoch values; the backend query language owns
/// the exact encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    /// Backend field the range applies to.
    pub field: String,
    /// Inclusive lower bound, if any.
    pub min: Option<f64>,
    /// Inclusive upper bound, if any.
    pub max: Option<f64>,
}

impl RangeFilter {
    /// Canonical serialization of this filter for change detection.
    fn key(&self) -> String {
        let bound = |b: Option<f64>| b.map_or_else(|| "*".to_string(), |v| v.to_string());
        format!("{}:{}..{}", self.field, bound(self.min), bound(self.max))
    }
}

/// The parameters of one search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The user's search term. Empty means no active term.
    #[serde(default)]
    pub term: String,
    /// Active range filters.
    #[serde(default)]
    pub range_filters: Vec<RangeFilter>,
    /// Active facet filter paths, per facet field.
    #[serde(default)]
    pub facet_filters: BTreeMap<String, Vec<String>>,
    /// Active sort field, if not relevance-sorted.
    #[serde(default)]
    pub sort_field: Option<String>,
    /// Term matching mode.
    #[serde(default)]
    pub mode: SearchMode,
}

impl SearchRequest {
    /// Creates a request for `term` with no filters.
    pub fn with_term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Canonical serialization of the range filters.
    ///
    /// Stable under filter reordering, so two requests with the same ranges
    /// always compare equal.
    pub fn range_key(&self) -> String {
        let mut keys: Vec<String> = self.range_filters.iter().map(RangeFilter::key).collect();
        keys.sort();
        keys.join(";")
    }

    /// Canonical serialization of the facet filters.
    ///
    /// Fields iterate in map order and paths are sorted, so the key is stable
    /// under path reordering.
    pub fn facet_key(&self) -> String {
        let mut parts = Vec::with_capacity(self.facet_filters.len());
        for (field, paths) in &self.facet_filters {
            let mut sorted = paths.clone();
            sorted.sort();
            parts.push(format!("{field}={}", sorted.join(",")));
        }
        parts.join(";")
    }
}
