//! Shardfold: Deterministic Multi-Writer Artifact Merging
//!
//! Many workers stream JSON artifacts into per-worker partial files without
//! coordinating. After all of them finish, a single merge folds the partials into
//! canonical files whose bytes depend only on the set of artifacts, never on how
//! work was split. A three-level SHA-256 Merkle tree over the canonical files (or
//! over the merged index) gives one root hash per build, and trees from two builds
//! can be compared path by path.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod store;
pub mod tree;
pub mod types;

pub use error::{ApiError, FormatError, StorageError};
pub use types::{Digest, Level, WorkerId};
