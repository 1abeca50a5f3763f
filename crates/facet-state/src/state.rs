//! The search state held in the widget store.
//!
//! One [`SearchState`] value lives in the store per widget instance. The
//! search client writes the current request into it when the user acts, and
//! writes responses into it as they land; the aggregation controller reacts
//! only when `response_serial` changes, so request-only updates (typing,
//! toggling) never trigger a tree rebuild against stale facet data.

use serde_json::Value;

use crate::SearchRequest;

/// Request/response state for one widget instance.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// The request the latest response answers.
    pub request: SearchRequest,
    /// Raw facet payload of the primary response, if one has landed.
    pub primary_facets: Option<Value>,
    /// Raw facet payload of the supplemental (unfiltered) response, if any.
    ///
    /// The supplemental response is computed without the facet dimension's own
    /// filter, so sibling counts stay visible while that filter is active.
    pub supplemental_facets: Option<Value>,
    /// Backend-reported time taken for the latest response, milliseconds.
    pub time_taken: Option<u64>,
    /// Monotonic response counter.
    ///
    /// Incremented by [`Self::record_response`]. Controllers compare this
    /// rather than `time_taken` so two equally fast responses cannot mask one
    /// another.
    pub response_serial: u64,
}

impl SearchState {
    /// Creates state carrying a request and no responses yet.
    pub fn with_request(request: SearchRequest) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    /// Records a landed response.
    ///
    /// The upstream search client suppresses stale and aborted responses, so
    /// every call here is the latest response for the current request.
    pub fn record_response(
        &mut self,
        primary_facets: Option<Value>,
        supplemental_facets: Option<Value>,
        time_taken: Option<u64>,
    ) {
        self.primary_facets = primary_facets;
        self.supplemental_facets = supplemental_facets;
        self.time_taken = time_taken;
        self.response_serial += 1;
    }
}
