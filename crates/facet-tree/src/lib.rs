//! Facet path trees for faceted search.
//!
//! This crate is the pure tree layer of the facet aggregation engine. A search
//! backend reports facet occurrences as flat `{path, count}` entries; this crate
//! turns those entries into a navigable prefix tree and merges successive,
//! partially-overlapping trees so a widget can carry facet state across requests.
//!
//! The pipeline has three distinct steps with distinct override semantics:
//!
//! 1. **Decode**: [`decode_payload`] turns a raw JSON facet payload into
//!    per-field entry forests, treating anything malformed as empty.
//! 2. **Build**: [`build`] turns an entry forest into a complete prefix tree
//!    rooted at `/`, creating missing ancestors and applying exclusion rules.
//! 3. **Merge**: [`merge`] unions two trees, letting the incoming tree's counts
//!    win at every shared path while keeping branches only one side knows about.
//!
//! All functions here are total over their input domain: malformed input
//! degrades to empty output, never to an error.
//!
//! # Example
//!
//! ```
//! use facet_tree::{FlatFacetEntry, build};
//!
//! let entries = vec![
//!     FlatFacetEntry::new("/news", 5),
//!     FlatFacetEntry::new("/news/local", 3),
//! ];
//! let tree = build(&entries, &[]);
//! assert_eq!(tree.count_at("/news"), Some(5));
//! assert_eq!(tree.count_at("/news/local"), Some(3));
//! ```

#![warn(missing_docs)]

mod build;
mod flat;
mod merge;
mod node;
pub mod path;

pub use build::{ExcludeRule, build};
pub use flat::{FlatFacetEntry, decode_payload, flatten};
pub use merge::merge;
pub use node::FacetNode;
