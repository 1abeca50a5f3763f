//! Wire-shape facet entries and payload decoding.
//!
//! A backend response reports facet occurrences per field as a forest of
//! `{path, count, children}` entries. Depth in that forest is irrelevant to
//! tree construction; only `path` determines where an entry lands. Payloads
//! arrive as raw JSON and are decoded leniently: anything malformed is treated
//! as an empty forest and logged, never surfaced as an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::path;

/// One facet occurrence as reported on the wire.
///
/// May carry nested children; [`flatten`] discards the nesting before tree
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatFacetEntry {
    /// Absolute facet path, e.g. `/news/local`.
    pub path: String,
    /// Matching-document count at this path.
    #[serde(default)]
    pub count: u64,
    /// Nested entries, if the backend reports a pre-nested shape.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FlatFacetEntry>,
}

impl FlatFacetEntry {
    /// Creates a leaf entry with no nested children.
    pub fn new(path: impl Into<String>, count: u64) -> Self {
        Self {
            path: path.into(),
            count,
            children: Vec::new(),
        }
    }
}

/// Flattens an entry forest into `(path, count)` pairs, depth-first.
///
/// Paths are normalized; a root-level synthetic `/` entry is skipped (its
/// children are still visited). Input order is preserved otherwise, which is
/// what gives the builder its last-write-wins behavior for duplicate paths.
pub fn flatten(forest: &[FlatFacetEntry]) -> Vec<(String, u64)> {
    let mut out = Vec::new();
    for entry in forest {
        flatten_into(entry, &mut out);
    }
    out
}

/// Recursive worker for [`flatten`].
fn flatten_into(entry: &FlatFacetEntry, out: &mut Vec<(String, u64)>) {
    let normalized = path::normalize(&entry.path);
    if normalized != path::ROOT {
        out.push((normalized, entry.count));
    }
    for child in &entry.children {
        flatten_into(child, out);
    }
}

/// Decodes a raw facet payload into per-field entry forests.
///
/// The payload shape is an array of single-key objects mapping a field name to
/// its entry forest, e.g. `[{"category": [...]}, {"tags": [...]}]`. A plain
/// object mapping field names to forests is accepted too. Any layer that does
/// not match is treated as empty: a missing/null payload decodes to no fields,
/// and a field whose forest fails to deserialize decodes to an empty forest.
pub fn decode_payload(value: &Value) -> BTreeMap<String, Vec<FlatFacetEntry>> {
    let mut fields = BTreeMap::new();
    match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(map) => collect_fields(map, &mut fields),
                    other => {
                        warn!(payload = %other, "ignoring non-object facet payload item");
                    }
                }
            }
        }
        Value::Object(map) => collect_fields(map, &mut fields),
        Value::Null => {}
        other => {
            warn!(payload = %other, "ignoring malformed facet payload");
        }
    }
    fields
}

/// Decodes each field's forest out of one payload object.
fn collect_fields(
    map: &serde_json::Map<String, Value>,
    fields: &mut BTreeMap<String, Vec<FlatFacetEntry>>,
) {
    for (field, forest) in map {
        match serde_json::from_value::<Vec<FlatFacetEntry>>(forest.clone()) {
            Ok(entries) => {
                fields.entry(field.clone()).or_default().extend(entries);
            }
            Err(err) => {
                warn!(field = %field, error = %err, "ignoring malformed facet forest");
                fields.entry(field.clone()).or_default();
            }
        }
    }
}
