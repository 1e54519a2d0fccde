//! Index Writer: per-worker append-only log of index entries

use crate::collector::naming::{self, META_DIR};
use crate::error::StorageError;
use crate::index::entry::IndexEntry;
use crate::store::AppendLog;
use crate::types::WorkerId;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Worker segment of the index partial when no worker id is available.
pub const MASTER_WORKER: &str = "master";

const PARTIAL_INDEX_PREFIX: &str = "partial_index";
const SUMMARY_FILE: &str = "index.json";

/// `.meta/partial_index.<worker>.jsonl` under `root`.
pub fn partial_index_path(root: &Path, worker: Option<&WorkerId>) -> PathBuf {
    let worker = worker.map(WorkerId::as_str).unwrap_or(MASTER_WORKER);
    root.join(META_DIR)
        .join(format!("{}.{}.jsonl", PARTIAL_INDEX_PREFIX, worker))
}

/// `.meta/index.json` under `root`.
pub fn summary_path(root: &Path) -> PathBuf {
    root.join(META_DIR).join(SUMMARY_FILE)
}

/// Whether `name` is an index partial (`Some(true)`), its lock (`Some(false)`), or neither.
pub(crate) fn classify_index_name(name: &str) -> Option<bool> {
    let rest = name.strip_prefix(PARTIAL_INDEX_PREFIX)?.strip_prefix('.')?;
    let (worker, extension) = rest.split_once('.')?;
    if worker.is_empty() {
        return None;
    }
    match extension {
        "jsonl" => Some(true),
        "lock" => Some(false),
        _ => None,
    }
}

/// Appends index entries for one worker. Scoped to the whole run, not to a logical file.
pub struct IndexWriter {
    log: AppendLog,
}

impl IndexWriter {
    pub fn new(root: &Path, worker: Option<&WorkerId>) -> Self {
        let path = partial_index_path(root, worker);
        let lock = naming::lock_path(&path);
        Self {
            log: AppendLog::new(path, lock),
        }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Append entries as one locked write. Nothing is created for an empty batch.
    pub fn append_batch<'a, I>(&mut self, entries: I) -> Result<usize, StorageError>
    where
        I: IntoIterator<Item = &'a IndexEntry>,
    {
        let mut payload = Vec::new();
        let mut count = 0usize;
        for entry in entries {
            serde_json::to_writer(&mut payload, entry)
                .map_err(|e| StorageError::io(self.log.path(), e.into()))?;
            payload.push(b'\n');
            count += 1;
        }
        self.log.append(&payload)?;
        debug!(count, index = %self.log.path().display(), "Appended index entries");
        Ok(count)
    }

    pub fn append(&mut self, entry: &IndexEntry) -> Result<(), StorageError> {
        self.append_batch([entry]).map(|_| ())
    }

    /// Create the index partial even if no entry is ever appended.
    pub fn create(&mut self) -> Result<(), StorageError> {
        self.log.create()
    }

    pub fn close(self) -> Result<(), StorageError> {
        self.log.close()
    }
}
