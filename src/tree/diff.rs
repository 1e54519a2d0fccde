//! Structural comparison of two hash trees by path

use crate::tree::node::HashNode;
use crate::tree::traverse::{traverse, TraversalOptions};
use crate::types::Digest;
use std::collections::BTreeMap;

/// One path whose digest differs, or that exists on only one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    /// `/`-joined path below the root; empty for the root itself.
    pub path: String,
    pub left: Option<Digest>,
    pub right: Option<Digest>,
}

impl DiffEntry {
    /// Path as shown to users; the root reads as `/`.
    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }

    /// Number of `/` separators, used to indent presented diffs.
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }
}

/// Flatten `root` into `path → digest` for every node where traversal stops.
///
/// Covering only the frontier means one differing leaf yields one entry, not one
/// per ancestor.
pub fn collect_hashes(root: &HashNode, options: &TraversalOptions) -> BTreeMap<String, Digest> {
    traverse(root, "", options)
        .into_iter()
        .filter(|visit| visit.is_frontier)
        .map(|visit| (visit.path, visit.node.digest()))
        .collect()
}

/// Every frontier path present in either tree whose digests differ, in ascending path order.
///
/// An empty result means the trees agree at these options, not necessarily at a
/// finer granularity.
pub fn diff(left: &HashNode, right: &HashNode, options: &TraversalOptions) -> Vec<DiffEntry> {
    let mut left_hashes = collect_hashes(left, options);
    let right_hashes = collect_hashes(right, options);

    let mut entries = Vec::new();
    for (path, right_digest) in right_hashes {
        match left_hashes.remove(&path) {
            Some(left_digest) if left_digest == right_digest => {}
            left_digest => entries.push(DiffEntry {
                path,
                left: left_digest,
                right: Some(right_digest),
            }),
        }
    }
    entries.extend(left_hashes.into_iter().map(|(path, left_digest)| DiffEntry {
        path,
        left: Some(left_digest),
        right: None,
    }));
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}
