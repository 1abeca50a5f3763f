//! The facet aggregation engine.
//!
//! A faceted-search widget issues requests through an out-of-scope search
//! client and receives flat per-request facet counts back. This crate turns
//! those payloads into the persistent, navigable tree the widget renders,
//! carrying a user's checked facets across query changes that would otherwise
//! make them vanish.
//!
//! The moving parts:
//!
//! - [`TransitionClassifier`] decides *why* the request changed since the last
//!   observation (new term, facet toggled, range moved, ...). Each cause
//!   demands a different merge policy for the incoming response.
//! - [`AggregationController`] subscribes to a widget's
//!   [`Store<SearchState>`](facet_state::Store), and on every landed response
//!   builds trees from the primary and supplemental payloads, applies the
//!   classified accumulation policy, and reconciles checked-but-absent paths
//!   into the final render-ready tree.
//! - [`WidgetRegistry`] lets several independent widgets coexist on one page,
//!   keyed by explicit instance ids with explicit teardown.
//!
//! # Example
//!
//! ```
//! use facet_engine::{AggregationController, FacetFieldConfig};
//! use facet_state::{SearchRequest, SearchState, Store};
//! use serde_json::json;
//!
//! let store = Store::new(SearchState::with_request(SearchRequest::with_term("boots")));
//! let controller = AggregationController::new(vec![FacetFieldConfig::new("category")]);
//! let _sub = controller.attach(&store);
//!
//! store.update(|state| {
//!     state.record_response(
//!         Some(json!({"category": [{"path": "/shoes", "count": 12}]})),
//!         None,
//!         Some(8),
//!     );
//! });
//! let tree = controller.tree("category").unwrap();
//! assert_eq!(tree.count_at("/shoes"), Some(12));
//! ```

#![warn(missing_docs)]

mod controller;
mod error;
mod registry;
mod transition;

pub use controller::{AggregationController, FacetFieldConfig};
pub use error::EngineError;
pub use registry::WidgetRegistry;
pub use transition::{TransitionClassifier, TransitionSignal};
