//! Artifact Merkle Tree
//!
//! Three levels, outer to inner: FOLDER (directory), FILE (canonical JSON file or
//! merged logical path) and TEST (one artifact). Leaves carry the digest the
//! generator declared; every interior digest is SHA-256 over its children's
//! digests in ascending name order.

pub mod builder;
pub mod diff;
pub mod hasher;
pub mod node;
pub mod path;
pub mod report;
pub mod traverse;
pub mod walker;

pub use builder::{from_index_entries, IndexTreeBuilder, TreeBuilder};
pub use diff::{collect_hashes, diff, DiffEntry};
pub use node::HashNode;
pub use report::{render, render_report, ReportMode};
pub use traverse::TraversalOptions;
