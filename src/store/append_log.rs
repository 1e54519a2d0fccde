//! Lazily opened append-only log with a per-append lock

use crate::error::StorageError;
use crate::store::lock::FileLockGuard;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

struct Handles {
    log: File,
    lock: File,
}

impl Handles {
    fn open(path: &Path, lock_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(lock_path)
            .map_err(|e| StorageError::io(lock_path, e))?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StorageError::io(path, e))?;
        debug!(log = %path.display(), "Opened append log");
        Ok(Self { log, lock })
    }
}

/// One append-only log file plus its sibling lock file.
///
/// Handles are opened on the first append and closed exactly once, by
/// [`AppendLog::close`] or on drop. Every append is a single write of whole
/// lines under the lock, so concurrent appenders never interleave a line.
pub struct AppendLog {
    path: PathBuf,
    lock_path: PathBuf,
    handles: Option<Handles>,
}

impl AppendLog {
    pub fn new(path: PathBuf, lock_path: PathBuf) -> Self {
        Self {
            path,
            lock_path,
            handles: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.handles.is_some()
    }

    /// Create the log (and its lock file) if it is not open yet, without writing anything.
    pub fn create(&mut self) -> Result<(), StorageError> {
        open_handles(&mut self.handles, &self.path, &self.lock_path)?;
        Ok(())
    }

    /// Append `payload` (one or more complete `\n`-terminated lines).
    pub fn append(&mut self, payload: &[u8]) -> Result<(), StorageError> {
        if payload.is_empty() {
            return Ok(());
        }
        let handles = open_handles(&mut self.handles, &self.path, &self.lock_path)?;

        let _guard = FileLockGuard::acquire(&handles.lock, &self.lock_path)?;
        handles
            .log
            .write_all(payload)
            .and_then(|()| handles.log.flush())
            .map_err(|e| StorageError::io(&self.path, e))
    }

    /// Flush to stable storage and release the handles.
    pub fn close(mut self) -> Result<(), StorageError> {
        if let Some(handles) = self.handles.take() {
            handles
                .log
                .sync_data()
                .map_err(|e| StorageError::io(&self.path, e))?;
        }
        Ok(())
    }
}

fn open_handles<'a>(
    slot: &'a mut Option<Handles>,
    path: &Path,
    lock_path: &Path,
) -> Result<&'a mut Handles, StorageError> {
    let handles = match slot.take() {
        Some(handles) => handles,
        None => Handles::open(path, lock_path)?,
    };
    Ok(slot.insert(handles))
}
