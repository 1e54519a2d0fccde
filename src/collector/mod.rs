//! Artifact collection
//!
//! Workers stream artifacts into per-worker partial files without coordinating;
//! after every worker has finished, [`merge_partials`] folds the partials into
//! canonical files whose bytes depend only on the set of artifacts.

pub mod canonical;
pub mod merge;
pub mod naming;
pub mod session;
pub mod writer;

pub use canonical::{to_document_string, write_canonical};
pub use merge::{merge_partials, MergeReport};
pub use session::{Artifact, ArtifactConsumer, Collector, SessionReport};
pub use writer::{PartialRecord, PartialWriter};
