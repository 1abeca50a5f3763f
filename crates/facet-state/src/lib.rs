//! Widget state for the facet aggregation engine.
//!
//! This crate holds everything the engine observes and mutates between
//! requests: the observable [`Store`] the search client writes responses into,
//! the [`SelectionTracker`] owning the user's checked facet paths, and the
//! request/state types whose canonical serializations drive transition
//! classification.
//!
//! Everything here is single-threaded and synchronous; the store dispatches
//! listeners in subscription order on the caller's stack.

#![warn(missing_docs)]

mod request;
mod selection;
mod state;
mod store;

pub use request::{RangeFilter, SearchMode, SearchRequest};
pub use selection::SelectionTracker;
pub use state::SearchState;
pub use store::{Store, Subscription};
