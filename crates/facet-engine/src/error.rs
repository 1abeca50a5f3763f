//! Error types for the facet engine.

use thiserror::Error;

/// Errors from widget registry operations.
///
/// Tree building and merging are deliberately infallible; the only fallible
/// surface of the engine is instance management.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// An instance id was registered twice without a teardown in between.
    #[error("widget instance already registered: {0}")]
    DuplicateInstance(String),

    /// A lookup or teardown referenced an id that is not registered.
    #[error("unknown widget instance: {0}")]
    UnknownInstance(String),
}
