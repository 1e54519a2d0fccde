//! Run-wide artifact index
//!
//! Each worker appends one compact [`IndexEntry`] per artifact to
//! `.meta/partial_index.<worker>.jsonl`; [`merge_index`] folds them into
//! `.meta/index.json`, whose root hash equals the hash tree of the merged
//! canonical files.

pub mod entry;
pub mod merge;
pub mod writer;

pub use entry::{IndexEntry, IndexSummary};
pub use merge::{has_partial_indexes, merge_index};
pub use writer::IndexWriter;
