//! The facet aggregation controller.
//!
//! The controller is the orchestration layer between the widget store and the
//! tree primitives. On every landed response it classifies the transition,
//! builds trees from the primary and supplemental facet payloads, applies the
//! accumulation policy the signal demands, and reconciles checked-but-absent
//! paths so a user's selections never vanish mid-refinement.
//!
//! Accumulation policy per signal:
//!
//! | Signal | Policy |
//! |---|---|
//! | `TermCleared` | reset to an empty tree |
//! | `NewTerm` | replace with the primary tree |
//! | `NewTermWithActiveFacets`, `RangeChanged`, `ModeChanged` | merge primary over supplemental; replace if no supplemental |
//! | `FacetChanged`, `SortChanged` | merge primary over the previous accumulated tree |
//! | `Unclassified` | leave the tree untouched |

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use facet_state::{SearchState, SelectionTracker, Store, Subscription};
use facet_tree::{ExcludeRule, FacetNode, FlatFacetEntry, build, decode_payload, merge};
use tracing::{debug, warn};

use crate::{TransitionClassifier, TransitionSignal};

/// Configuration for one facet field the widget renders.
#[derive(Debug, Clone)]
pub struct FacetFieldConfig {
    /// The backend field name, e.g. `category`.
    pub field: String,
    /// Exclusion rules applied when building this field's trees.
    pub exclude: Vec<ExcludeRule>,
}

impl FacetFieldConfig {
    /// Creates a field config with no exclusions.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            exclude: Vec::new(),
        }
    }

    /// Adds an exclusion rule (leading `/` for a subtree, bare name for a
    /// segment).
    pub fn exclude(mut self, rule: &str) -> Self {
        self.exclude.push(ExcludeRule::parse(rule));
        self
    }
}

/// Per-field aggregation state.
struct FieldState {
    /// Exclusion rules for this field's builder invocations.
    exclude: Vec<ExcludeRule>,
    /// Checked paths. Mutated only through [`AggregationController::toggle`].
    selection: SelectionTracker,
    /// The running merged tree carried across requests, pre-reconciliation.
    accumulated: FacetNode,
    /// The reconciled tree handed to the rendering layer.
    rendered: FacetNode,
}

impl FieldState {
    /// Creates empty state for one configured field.
    fn new(config: &FacetFieldConfig) -> Self {
        Self {
            exclude: config.exclude.clone(),
            selection: SelectionTracker::new(),
            accumulated: FacetNode::root(),
            rendered: FacetNode::root(),
        }
    }

    /// Recomputes the render-ready tree from the accumulated tree.
    ///
    /// Every checked path absent from the accumulated tree is synthesized as
    /// a zero-count leaf and merged underneath it, accumulated counts winning
    /// on overlap.
    fn reconcile(&mut self) {
        let missing: Vec<FlatFacetEntry> = self
            .selection
            .selected_paths()
            .into_iter()
            .filter(|p| self.accumulated.node_at(p).is_none())
            .map(|p| FlatFacetEntry::new(p, 0))
            .collect();
        if missing.is_empty() {
            self.rendered = self.accumulated.clone();
        } else {
            let synthetic = build(&missing, &[]);
            self.rendered = merge(&synthetic, &self.accumulated);
        }
    }
}

/// Mutable controller internals, shared with the store listener.
struct Inner {
    /// Classifier owning the last-seen request scalars.
    classifier: TransitionClassifier,
    /// Per-field aggregation state, keyed by field name.
    fields: BTreeMap<String, FieldState>,
    /// Signal of the most recently processed response.
    last_signal: Option<TransitionSignal>,
    /// Serial of the most recently processed response.
    last_serial: u64,
}

impl Inner {
    /// Reacts to a store notification.
    ///
    /// Updates with an unchanged response serial (typing, toggling, anything
    /// request-only) are ignored; the trees only move when a response lands.
    fn on_update(&mut self, state: &SearchState) {
        if state.response_serial == self.last_serial {
            return;
        }
        self.last_serial = state.response_serial;

        let any_selected = self
            .fields
            .values()
            .any(|field| field.selection.is_any_selected());
        let signal = self.classifier.classify(&state.request, any_selected);
        self.last_signal = Some(signal);
        debug!(?signal, serial = state.response_serial, "classified response");

        if signal == TransitionSignal::Unclassified {
            return;
        }

        let primary = state
            .primary_facets
            .as_ref()
            .map(decode_payload)
            .unwrap_or_default();
        let supplemental = state.supplemental_facets.as_ref().map(decode_payload);

        for (field, field_state) in &mut self.fields {
            let primary_tree = build(
                primary.get(field).map_or(&[][..], Vec::as_slice),
                &field_state.exclude,
            );
            // A supplemental payload that exists but omits this field counts
            // as absent for the field: the policy degrades to replace.
            let supplemental_tree = supplemental
                .as_ref()
                .and_then(|fields| fields.get(field))
                .map(|entries| build(entries, &field_state.exclude));

            field_state.accumulated = match signal {
                TransitionSignal::TermCleared => FacetNode::root(),
                TransitionSignal::NewTerm => primary_tree,
                TransitionSignal::NewTermWithActiveFacets
                | TransitionSignal::RangeChanged
                | TransitionSignal::ModeChanged => match supplemental_tree {
                    Some(sup) => merge(&sup, &primary_tree),
                    None => primary_tree,
                },
                TransitionSignal::FacetChanged | TransitionSignal::SortChanged => {
                    merge(&field_state.accumulated, &primary_tree)
                }
                TransitionSignal::Unclassified => field_state.accumulated.clone(),
            };
            field_state.reconcile();
        }
    }
}

/// Orchestrates facet aggregation for one widget instance.
///
/// Cloning the controller clones a handle to the same instance; this is how
/// the store listener and the widget's interaction path share state on one
/// thread.
pub struct AggregationController {
    /// Shared internals.
    inner: Rc<RefCell<Inner>>,
}

impl Clone for AggregationController {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for AggregationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationController").finish_non_exhaustive()
    }
}

impl PartialEq for AggregationController {
    /// Two controllers are equal when they are handles to the same instance.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl AggregationController {
    /// Creates a controller for the given facet fields.
    pub fn new(fields: Vec<FacetFieldConfig>) -> Self {
        let field_states = fields
            .iter()
            .map(|config| (config.field.clone(), FieldState::new(config)))
            .collect();
        Self {
            inner: Rc::new(RefCell::new(Inner {
                classifier: TransitionClassifier::new(),
                fields: field_states,
                last_signal: None,
                last_serial: 0,
            })),
        }
    }

    /// Subscribes this controller to a widget store.
    ///
    /// The returned subscription must be kept alive (typically inside the
    /// [`WidgetRegistry`](crate::WidgetRegistry)); dropping it detaches the
    /// controller.
    #[must_use = "dropping the subscription detaches the controller"]
    pub fn attach(&self, store: &Store<SearchState>) -> Subscription<SearchState> {
        let inner = Rc::clone(&self.inner);
        store.subscribe(move |state| inner.borrow_mut().on_update(state))
    }

    /// Feeds one state observation directly, without a store.
    pub fn observe(&self, state: &SearchState) {
        self.inner.borrow_mut().on_update(state);
    }

    /// Returns the render-ready tree for a field.
    pub fn tree(&self, field: &str) -> Option<FacetNode> {
        self.inner
            .borrow()
            .fields
            .get(field)
            .map(|f| f.rendered.clone())
    }

    /// Returns a snapshot of a field's selection for the rendering layer.
    pub fn selection(&self, field: &str) -> Option<SelectionTracker> {
        self.inner
            .borrow()
            .fields
            .get(field)
            .map(|f| f.selection.clone())
    }

    /// Flips the checked state of a facet path.
    ///
    /// The render-ready tree is reconciled immediately so a freshly checked
    /// path shows up (zero-count if the backend has not reported it) without
    /// waiting for the next response. Returns the new checked state, or
    /// `None` for an unconfigured field.
    pub fn toggle(&self, field: &str, facet_path: &str) -> Option<bool> {
        let mut inner = self.inner.borrow_mut();
        let Some(field_state) = inner.fields.get_mut(field) else {
            warn!(field, "toggle on unconfigured facet field");
            return None;
        };
        let checked = field_state.selection.toggle(facet_path);
        field_state.reconcile();
        Some(checked)
    }

    /// Returns the leaf-only filter paths the outgoing query should carry for
    /// a field. Empty for an unconfigured field.
    pub fn outgoing_filter_paths(&self, field: &str) -> Vec<String> {
        self.inner
            .borrow()
            .fields
            .get(field)
            .map(|f| f.selection.outgoing_filter_paths())
            .unwrap_or_default()
    }

    /// Returns true if any facet path is checked on any field.
    pub fn is_any_selected(&self) -> bool {
        self.inner
            .borrow()
            .fields
            .values()
            .any(|f| f.selection.is_any_selected())
    }

    /// Returns the signal of the most recently processed response.
    pub fn last_signal(&self) -> Option<TransitionSignal> {
        self.inner.borrow().last_signal
    }

    /// Returns the configured field names, sorted.
    pub fn fields(&self) -> Vec<String> {
        self.inner.borrow().fields.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use facet_state::SearchRequest;
    use serde_json::json;

    use super::*;

    fn controller() -> AggregationController {
        AggregationController::new(vec![FacetFieldConfig::new("category")])
    }

    fn respond(state: &mut SearchState, primary: serde_json::Value) {
        state.record_response(Some(primary), None, Some(10));
    }

    #[test]
    fn test_fresh_term_builds_primary_tree() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(
            &mut state,
            json!({"category": [
                {"path": "/news", "count": 5},
                {"path": "/news/local", "count": 3}
            ]}),
        );
        ctrl.observe(&state);

        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::NewTerm));
        let tree = ctrl.tree("category").unwrap();
        assert_eq!(tree.count_at("/news"), Some(5));
        assert_eq!(tree.count_at("/news/local"), Some(3));
    }

    #[test]
    fn test_same_serial_is_ignored() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(&mut state, json!({"category": [{"path": "/news", "count": 5}]}));
        ctrl.observe(&state);
        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::NewTerm));

        // A request-only update carries the same serial and must not
        // reclassify.
        state.request.term = "sandals".to_string();
        ctrl.observe(&state);
        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::NewTerm));
        assert_eq!(ctrl.tree("category").unwrap().count_at("/news"), Some(5));
    }

    #[test]
    fn test_new_term_replaces_tree() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(&mut state, json!({"category": [{"path": "/news", "count": 5}]}));
        ctrl.observe(&state);

        state.request = SearchRequest::with_term("sandals");
        respond(&mut state, json!({"category": [{"path": "/sports", "count": 2}]}));
        ctrl.observe(&state);

        let tree = ctrl.tree("category").unwrap();
        assert_eq!(tree.count_at("/sports"), Some(2));
        assert!(tree.node_at("/news").is_none());
    }

    #[test]
    fn test_term_cleared_resets_tree() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(&mut state, json!({"category": [{"path": "/news", "count": 5}]}));
        ctrl.observe(&state);

        state.request = SearchRequest::with_term("");
        respond(&mut state, json!({"category": []}));
        ctrl.observe(&state);

        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::TermCleared));
        assert!(ctrl.tree("category").unwrap().is_empty());
    }

    #[test]
    fn test_facet_changed_accumulates() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(&mut state, json!({"category": [{"path": "/news", "count": 5}]}));
        ctrl.observe(&state);

        state
            .request
            .facet_filters
            .insert("category".to_string(), vec!["/news".to_string()]);
        respond(&mut state, json!({"category": [{"path": "/sports", "count": 2}]}));
        ctrl.observe(&state);

        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::FacetChanged));
        let tree = ctrl.tree("category").unwrap();
        assert_eq!(tree.count_at("/news"), Some(5));
        assert_eq!(tree.count_at("/sports"), Some(2));
    }

    #[test]
    fn test_range_changed_prefers_supplemental() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(&mut state, json!({"category": [{"path": "/news", "count": 5}]}));
        ctrl.observe(&state);

        state.request.range_filters.push(facet_state::RangeFilter {
            field: "price".to_string(),
            min: Some(10.0),
            max: None,
        });
        state.record_response(
            Some(json!({"category": [{"path": "/news", "count": 2}]})),
            Some(json!({"category": [
                {"path": "/news", "count": 5},
                {"path": "/sports", "count": 4}
            ]})),
            Some(10),
        );
        ctrl.observe(&state);

        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::RangeChanged));
        let tree = ctrl.tree("category").unwrap();
        // Primary wins the shared path, supplemental keeps the sibling.
        assert_eq!(tree.count_at("/news"), Some(2));
        assert_eq!(tree.count_at("/sports"), Some(4));
    }

    #[test]
    fn test_missing_supplemental_degrades_to_replace() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(&mut state, json!({"category": [{"path": "/news", "count": 5}]}));
        ctrl.observe(&state);

        state.request.mode = facet_state::SearchMode::Fuzzy;
        respond(&mut state, json!({"category": [{"path": "/sports", "count": 2}]}));
        ctrl.observe(&state);

        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::ModeChanged));
        let tree = ctrl.tree("category").unwrap();
        assert_eq!(tree.count_at("/sports"), Some(2));
        assert!(tree.node_at("/news").is_none());
    }

    #[test]
    fn test_selection_survives_non_appearance() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(&mut state, json!({"category": [{"path": "/news", "count": 5}]}));
        ctrl.observe(&state);

        ctrl.toggle("category", "/news").unwrap();

        // A fresh response for a refined facet no longer reports /news.
        state
            .request
            .facet_filters
            .insert("category".to_string(), vec!["/news".to_string()]);
        respond(&mut state, json!({"category": [{"path": "/sports", "count": 2}]}));
        ctrl.observe(&state);

        let tree = ctrl.tree("category").unwrap();
        assert_eq!(tree.count_at("/news"), Some(5)); // still accumulated
        assert_eq!(tree.count_at("/sports"), Some(2));

        // Replace the tree wholesale via a new term while /news stays checked.
        state.request = SearchRequest::with_term("sandals");
        respond(&mut state, json!({"category": [{"path": "/sports", "count": 9}]}));
        ctrl.observe(&state);
        assert_eq!(
            ctrl.last_signal(),
            Some(TransitionSignal::NewTermWithActiveFacets)
        );

        let tree = ctrl.tree("category").unwrap();
        // The checked path is synthesized at zero, never dropped.
        assert_eq!(tree.count_at("/news"), Some(0));
        assert_eq!(tree.count_at("/sports"), Some(9));
    }

    #[test]
    fn test_toggle_reconciles_immediately() {
        let ctrl = controller();
        assert_eq!(ctrl.toggle("category", "/news/local"), Some(true));

        let tree = ctrl.tree("category").unwrap();
        assert_eq!(tree.count_at("/news/local"), Some(0));
        assert_eq!(tree.count_at("/news"), Some(0));

        assert_eq!(ctrl.toggle("category", "/news/local"), Some(false));
        assert!(ctrl.tree("category").unwrap().is_empty());
    }

    #[test]
    fn test_toggle_unknown_field() {
        let ctrl = controller();
        assert_eq!(ctrl.toggle("brand", "/acme"), None);
        assert!(ctrl.outgoing_filter_paths("brand").is_empty());
    }

    #[test]
    fn test_exclusions_apply_to_both_payloads() {
        let ctrl = AggregationController::new(vec![
            FacetFieldConfig::new("category").exclude("/news/local"),
        ]);
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(
            &mut state,
            json!({"category": [
                {"path": "/news", "count": 5},
                {"path": "/news/local", "count": 3}
            ]}),
        );
        ctrl.observe(&state);

        let tree = ctrl.tree("category").unwrap();
        assert_eq!(tree.count_at("/news"), Some(5));
        assert!(tree.node_at("/news/local").is_none());
    }

    #[test]
    fn test_malformed_payload_is_empty_forest() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        state.record_response(Some(json!("garbage")), None, Some(10));
        ctrl.observe(&state);

        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::NewTerm));
        assert!(ctrl.tree("category").unwrap().is_empty());
    }

    #[test]
    fn test_unclassified_keeps_previous_tree() {
        let ctrl = controller();
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(&mut state, json!({"category": [{"path": "/news", "count": 5}]}));
        ctrl.observe(&state);

        // Same request, fresh response: nothing recognizable changed.
        respond(&mut state, json!({"category": [{"path": "/sports", "count": 2}]}));
        ctrl.observe(&state);

        assert_eq!(ctrl.last_signal(), Some(TransitionSignal::Unclassified));
        let tree = ctrl.tree("category").unwrap();
        assert_eq!(tree.count_at("/news"), Some(5));
        assert!(tree.node_at("/sports").is_none());
    }

    #[test]
    fn test_fields_are_independent() {
        let ctrl = AggregationController::new(vec![
            FacetFieldConfig::new("category"),
            FacetFieldConfig::new("brand"),
        ]);
        let mut state = SearchState::with_request(SearchRequest::with_term("boots"));
        respond(
            &mut state,
            json!({
                "category": [{"path": "/news", "count": 5}],
                "brand": [{"path": "/acme", "count": 7}]
            }),
        );
        ctrl.observe(&state);

        assert_eq!(ctrl.tree("category").unwrap().count_at("/news"), Some(5));
        assert_eq!(ctrl.tree("brand").unwrap().count_at("/acme"), Some(7));
        assert!(ctrl.tree("category").unwrap().node_at("/acme").is_none());
    }
}
