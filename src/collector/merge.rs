//! Partial Merger: fold every worker's partial files into canonical JSON files

use crate::collector::canonical::write_canonical;
use crate::collector::naming::{self, META_DIR};
use crate::collector::writer::PartialRecord;
use crate::error::{ApiError, FormatError, StorageError};
use crate::store::persist_as;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Outcome of a successful merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Canonical files written
    pub targets: usize,
    /// Distinct artifacts across all targets
    pub artifacts: usize,
    /// Partial files consumed and deleted
    pub partials_removed: usize,
    /// Lock files deleted, including stale ones with no partial
    pub locks_removed: usize,
}

struct PartialScan {
    partials: Vec<PathBuf>,
    locks: BTreeSet<PathBuf>,
}

/// Merge all partial files under `root` into their canonical targets.
///
/// Every target is rendered to a staging file first; canonical files are only
/// replaced once all targets parsed cleanly, so a malformed partial leaves no
/// canonical output behind. Partials and lock files are removed last.
#[instrument(fields(root = %root.display()))]
pub fn merge_partials(root: &Path) -> Result<MergeReport, ApiError> {
    let start = Instant::now();
    let scan = scan(root)?;
    if scan.partials.is_empty() {
        return Err(ApiError::NoPartialsFound(root.to_path_buf()));
    }

    let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for partial in scan.partials {
        if let Some(target) = naming::target_for_partial(&partial) {
            groups.entry(target).or_default().push(partial);
        }
    }
    info!(targets = groups.len(), "Merging partial files");

    let mut report = MergeReport::default();
    let mut staged = Vec::with_capacity(groups.len());
    for (target, partials) in &groups {
        let entries = read_partials(partials)?;
        debug!(
            target = %target.display(),
            partials = partials.len(),
            artifacts = entries.len(),
            "Staged canonical file"
        );
        report.artifacts += entries.len();
        staged.push((target, stage(target, &entries)?));
    }

    for (target, temp) in staged {
        persist_as(temp, target)?;
        report.targets += 1;
    }

    let mut locks = scan.locks;
    for partial in groups.values().flatten() {
        remove_file(partial)?;
        report.partials_removed += 1;
        locks.insert(naming::lock_path(partial));
    }
    for lock in &locks {
        if remove_if_exists(lock)? {
            report.locks_removed += 1;
        }
    }

    info!(
        targets = report.targets,
        artifacts = report.artifacts,
        partials_removed = report.partials_removed,
        locks_removed = report.locks_removed,
        duration_ms = start.elapsed().as_millis(),
        "Partial merge completed"
    );
    Ok(report)
}

fn scan(root: &Path) -> Result<PartialScan, StorageError> {
    let mut partials = Vec::new();
    let mut locks = BTreeSet::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != META_DIR);
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            StorageError::io(path, io::Error::from(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if naming::parse_partial_name(name).is_some() {
            partials.push(entry.into_path());
        } else if naming::is_partial_lock_name(name) {
            locks.insert(entry.into_path());
        }
    }

    Ok(PartialScan { partials, locks })
}

/// Read partials in file order; a repeated id keeps its last value.
fn read_partials(partials: &[PathBuf]) -> Result<BTreeMap<String, String>, ApiError> {
    let mut entries = BTreeMap::new();
    for partial in partials {
        let file = File::open(partial).map_err(|e| StorageError::io(partial, e))?;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| StorageError::io(partial, e))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: PartialRecord =
                serde_json::from_str(line).map_err(|e| FormatError::InvalidPartialLine {
                    path: partial.clone(),
                    line: index + 1,
                    reason: e.to_string(),
                })?;
            if entries.insert(record.id, record.document).is_some() {
                warn!(partial = %partial.display(), line = index + 1, "Duplicate artifact id, keeping last");
            }
        }
    }
    Ok(entries)
}

fn stage(target: &Path, entries: &BTreeMap<String, String>) -> Result<NamedTempFile, StorageError> {
    let dir = target.parent().unwrap_or(Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    {
        let mut out = BufWriter::new(temp.as_file_mut());
        write_canonical(entries, &mut out)
            .and_then(|()| out.flush())
            .map_err(|e| StorageError::io(target, e))?;
    }
    Ok(temp)
}

fn remove_file(path: &Path) -> Result<(), StorageError> {
    fs::remove_file(path).map_err(|e| StorageError::io(path, e))
}

fn remove_if_exists(path: &Path) -> Result<bool, StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io(path, e)),
    }
}
