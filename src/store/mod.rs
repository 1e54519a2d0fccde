//! Append-only line storage
//!
//! Every worker-owned log (artifact partials and index partials) is a JSON-lines
//! file guarded by a sibling lock file. Writers never read what is already there.
//! Merged outputs are staged and renamed into place with [`persist_as`].

pub mod append_log;
pub mod lock;
pub mod replace;

pub use append_log::AppendLog;
pub use lock::FileLockGuard;
pub use replace::persist_as;
