//! Scoped exclusive file locks

use crate::error::StorageError;
use fs4::fs_std::FileExt;
use std::fs::File;
use std::path::Path;
use tracing::{trace, warn};

/// Exclusive advisory lock held on a lock file until dropped.
///
/// The lock is taken on an open file description, so two writers in the same
/// process holding separate handles to one lock file still exclude each other.
pub struct FileLockGuard<'a> {
    file: &'a File,
    path: &'a Path,
}

impl<'a> FileLockGuard<'a> {
    /// Block until the exclusive lock on `file` is acquired.
    pub fn acquire(file: &'a File, path: &'a Path) -> Result<Self, StorageError> {
        FileExt::lock_exclusive(file).map_err(|source| StorageError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        trace!(lock = %path.display(), "Acquired lock");
        Ok(Self { file, path })
    }
}

impl Drop for FileLockGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(self.file) {
            // Closing the handle releases the lock anyway.
            warn!(lock = %self.path.display(), error = %e, "Failed to release lock");
        }
    }
}
