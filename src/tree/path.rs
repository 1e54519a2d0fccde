//! Logical path handling
//!
//! Index entries address the tree with slash-delimited relative paths. These
//! helpers convert between those strings and filesystem paths without touching
//! the filesystem.

use std::path::{Component, Path};

/// Split a logical path into its non-empty segments.
///
/// Both `/` and `\` separate segments; `.` segments are dropped.
pub fn segments(logical_path: &str) -> Vec<&str> {
    logical_path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// Render a relative filesystem path as a slash-delimited logical path.
pub fn to_logical_string(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
