//! Partial-file naming convention
//!
//! `<stem>.partial.<worker>.jsonl` with a sibling `<stem>.partial.<worker>.lock`,
//! merged into `<stem>.json`. Worker ids never contain `.`, so the worker segment
//! is always the last one before the extension.

use crate::types::WorkerId;
use std::path::{Path, PathBuf};

/// Directory (at the output root) holding index partials and the summary; never hashed.
pub const META_DIR: &str = ".meta";

/// Worker segment used when no worker id is available.
pub const MAIN_WORKER: &str = "main";

const PARTIAL_MARKER: &str = ".partial";
const PARTIAL_EXTENSION: &str = "jsonl";
const LOCK_EXTENSION: &str = "lock";
const CANONICAL_EXTENSION: &str = "json";

/// Worker segment for a partial file name.
pub fn worker_segment(worker: Option<&WorkerId>) -> &str {
    worker.map(WorkerId::as_str).unwrap_or(MAIN_WORKER)
}

/// Partial file for `logical_path` (relative to `root`) owned by `worker`.
pub fn partial_path(root: &Path, logical_path: &Path, worker: Option<&WorkerId>) -> PathBuf {
    root.join(logical_path).with_extension(format!(
        "partial.{}.{}",
        worker_segment(worker),
        PARTIAL_EXTENSION
    ))
}

/// Sibling lock file of any append log.
pub fn lock_path(log_path: &Path) -> PathBuf {
    log_path.with_extension(LOCK_EXTENSION)
}

/// Split a partial file name into `(stem, worker)`.
pub fn parse_partial_name(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_suffix(PARTIAL_EXTENSION)?.strip_suffix('.')?;
    split_stem_and_worker(rest)
}

/// True for `<stem>.partial.<worker>.lock`, including locks left behind without a log.
pub fn is_partial_lock_name(name: &str) -> bool {
    name.strip_suffix(LOCK_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .and_then(split_stem_and_worker)
        .is_some()
}

fn split_stem_and_worker(rest: &str) -> Option<(&str, &str)> {
    let (rest, worker) = rest.rsplit_once('.')?;
    let stem = rest.strip_suffix(PARTIAL_MARKER)?;
    if stem.is_empty() || worker.is_empty() {
        return None;
    }
    Some((stem, worker))
}

/// Canonical file a partial file merges into.
pub fn target_for_partial(partial: &Path) -> Option<PathBuf> {
    let name = partial.file_name()?.to_str()?;
    let (stem, _) = parse_partial_name(name)?;
    let target_name = format!("{}.{}", stem, CANONICAL_EXTENSION);
    Some(match partial.parent() {
        Some(parent) => parent.join(target_name),
        None => PathBuf::from(target_name),
    })
}
