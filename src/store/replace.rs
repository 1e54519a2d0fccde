//! Atomic replacement of output files

use crate::error::StorageError;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::trace;

/// Rename `staged` over `target`, giving it the permissions `target` has or would get.
///
/// Staging files are created owner-only. An existing target keeps its mode; a new
/// target gets the mode an ordinary create under the process umask produces.
pub fn persist_as(staged: NamedTempFile, target: &Path) -> Result<(), StorageError> {
    let permissions = match fs::metadata(target) {
        Ok(metadata) => metadata.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(target)
            .and_then(|file| file.metadata())
            .map(|metadata| metadata.permissions())
            .map_err(|e| StorageError::io(target, e))?,
        Err(e) => return Err(StorageError::io(target, e)),
    };
    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(|e| StorageError::io(staged.path(), e))?;
    staged
        .persist(target)
        .map_err(|e| StorageError::io(target, e.error))?;
    trace!(target = %target.display(), "Replaced output file");
    Ok(())
}
