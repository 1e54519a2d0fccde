//! Partial Writer: per-worker, per-logical-file append-only logs

use crate::collector::naming;
use crate::error::StorageError;
use crate::store::AppendLog;
use crate::types::WorkerId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

/// One line of a partial file: artifact id and its already-serialized document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartialRecord {
    #[serde(rename = "k")]
    pub id: String,
    #[serde(rename = "v")]
    pub document: String,
}

#[derive(Serialize)]
struct PartialRecordRef<'a> {
    k: &'a str,
    v: &'a str,
}

/// Streams artifacts to `<logical stem>.partial.<worker>.jsonl` files under `root`.
///
/// Appends never read existing content. Each logical file gets its own
/// [`AppendLog`], opened lazily and kept until [`PartialWriter::close`].
/// The writer is `Sync`; threads appending to different logical files only
/// contend on the handle map, never on each other's logs.
pub struct PartialWriter {
    root: PathBuf,
    worker: Option<WorkerId>,
    logs: Mutex<HashMap<PathBuf, Arc<Mutex<AppendLog>>>>,
}

impl PartialWriter {
    pub fn new(root: impl Into<PathBuf>, worker: Option<WorkerId>) -> Self {
        Self {
            root: root.into(),
            worker,
            logs: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn worker(&self) -> Option<&WorkerId> {
        self.worker.as_ref()
    }

    /// Partial file this writer uses for `logical_path`.
    pub fn partial_path(&self, logical_path: &Path) -> PathBuf {
        naming::partial_path(&self.root, logical_path, self.worker.as_ref())
    }

    /// Append one artifact destined for `logical_path` (relative to the root).
    pub fn append(
        &self,
        logical_path: &Path,
        id: &str,
        document: &str,
    ) -> Result<PathBuf, StorageError> {
        self.append_batch(logical_path, [(id, document)])
    }

    /// Append several artifacts for one logical file under a single lock acquisition.
    #[instrument(skip_all, fields(logical_path = %logical_path.display()))]
    pub fn append_batch<'a, I>(&self, logical_path: &Path, artifacts: I) -> Result<PathBuf, StorageError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let partial = self.partial_path(logical_path);

        let mut payload = Vec::new();
        let mut count = 0usize;
        for (id, document) in artifacts {
            serde_json::to_writer(&mut payload, &PartialRecordRef { k: id, v: document })
                .map_err(|e| StorageError::io(&partial, e.into()))?;
            payload.push(b'\n');
            count += 1;
        }

        let log = {
            let mut logs = self.logs.lock();
            Arc::clone(logs.entry(partial.clone()).or_insert_with(|| {
                Arc::new(Mutex::new(AppendLog::new(
                    partial.clone(),
                    naming::lock_path(&partial),
                )))
            }))
        };
        log.lock().append(&payload)?;
        debug!(count, partial = %partial.display(), "Appended artifacts");
        Ok(partial)
    }

    /// Close every open log. All handles are released even if one fails; the first error is returned.
    pub fn close(self) -> Result<(), StorageError> {
        let mut first_error = None;
        for (_, log) in self.logs.into_inner() {
            let log = match Arc::try_unwrap(log) {
                Ok(log) => log.into_inner(),
                // Still shared: the writer itself is being consumed, so this cannot happen.
                Err(_) => continue,
            };
            if let Err(e) = log.close() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
