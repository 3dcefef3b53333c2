//! Symbol path normalization.
//!
//! TypeDoc emits barrel files as modules named `index`, so the same symbol can
//! show up as `pkg.index.Foo` in the API tree and `pkg.Foo` in the spec.
//! Every path is normalized before it is used as a map key.

/// Segment name TypeDoc uses for barrel (`index.ts`) modules.
pub const INDEX_SEGMENT: &str = "index";

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Canonicalize a dotted symbol path.
///
/// Removes every `index` segment and the empty segments left behind, so
/// `A.index.B` and `A..B` both become `A.B`. Idempotent.
pub fn normalize_path(path: &str) -> String {
    path.split(SEPARATOR)
        .filter(|segment| !segment.is_empty() && *segment != INDEX_SEGMENT)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a path into its segments.
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() { Vec::new() } else { path.split(SEPARATOR).collect() }
}

/// Append a child name to an ancestor path.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() { name.to_string() } else { format!("{parent}{SEPARATOR}{name}") }
}

/// Path of the enclosing symbol, or `None` for a root.
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once(SEPARATOR).map(|(parent, _)| parent)
}

/// Last segment of a path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit_once(SEPARATOR).map_or(path, |(_, last)| last)
}
