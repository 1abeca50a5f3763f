//! Facet path handling.
//!
//! Facet paths are absolute, slash-delimited strings rooted at `/`, e.g.
//! `/news/local`. The root path is `/` itself. All comparisons in this module
//! are segment-boundary-safe: `/news` relates to `/news/local` but never to
//! `/newsletter`.

/// The root facet path.
pub const ROOT: &str = "/";

/// Returns the non-empty segments of a facet path, in order.
///
/// Leading, trailing, and repeated slashes produce no segments, so `/a//b/`
/// yields `["a", "b"]` and `/` yields nothing.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Normalizes a path to its canonical form.
///
/// Canonical form is a leading slash, single-slash-separated non-empty
/// segments, and no trailing slash. The empty path and any all-slash path
/// normalize to [`ROOT`].
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in segments(path) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Joins a child segment onto a parent path.
///
/// The root parent is treated as empty so the result never contains a double
/// slash: `join("/", "news")` is `/news`, `join("/news", "local")` is
/// `/news/local`.
pub fn join(parent: &str, segment: &str) -> String {
    if parent == ROOT {
        format!("/{segment}")
    } else {
        format!("{parent}/{segment}")
    }
}

/// Returns the parent path, or `None` for the root.
///
/// Single-segment paths have the root as their parent.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Segment-boundary-safe path-prefix test.
///
/// Returns true when `path` is `prefix` itself or lies underneath it in the
/// hierarchy. Unlike a raw `starts_with`, `/news` is not a prefix of
/// `/newsletter`. The root is a prefix of every path.
pub fn is_path_prefix(prefix: &str, path: &str) -> bool {
    if prefix == ROOT {
        return true;
    }
    path == prefix || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}
