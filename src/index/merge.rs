//! Index Merger: fold every worker's index partial into `.meta/index.json`

use crate::collector::naming::META_DIR;
use crate::error::{ApiError, FormatError, StorageError};
use crate::index::entry::{IndexEntry, IndexSummary};
use crate::index::writer::{classify_index_name, summary_path};
use crate::store::persist_as;
use crate::tree::IndexTreeBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

/// Merge all index partials under `root/.meta` and write the summary.
///
/// Entries are keyed by `(json_path, id)`; a repeated key keeps the record read
/// last (partials in file name order, lines in file order). Entries without a
/// hash count toward `test_count` but not toward `root_hash`.
#[instrument(fields(root = %root.display()))]
pub fn merge_index(root: &Path) -> Result<IndexSummary, ApiError> {
    let start = Instant::now();
    let meta = root.join(META_DIR);
    let (partials, locks) = scan(&meta)?;
    if partials.is_empty() {
        return Err(ApiError::NoPartialIndexesFound(root.to_path_buf()));
    }

    let entries = read_entries(&partials)?;
    let summary = summarize(entries.values())?;

    let target = summary_path(root);
    let mut temp = NamedTempFile::new_in(&meta).map_err(|e| StorageError::io(&meta, e))?;
    {
        let mut out = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut out, &summary)
            .map_err(io::Error::from)
            .and_then(|()| out.flush())
            .map_err(|e| StorageError::io(&target, e))?;
    }
    persist_as(temp, &target)?;

    for path in partials.iter().chain(&locks) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::io(path, e).into()),
        }
    }

    info!(
        partials = partials.len(),
        test_count = summary.test_count,
        root_hash = %summary.root_hash,
        duration_ms = start.elapsed().as_millis(),
        "Index merge completed"
    );
    Ok(summary)
}

/// Whether `root/.meta` holds at least one index partial.
pub fn has_partial_indexes(root: &Path) -> bool {
    scan(&root.join(META_DIR)).is_ok_and(|(partials, _)| !partials.is_empty())
}

/// Compute the summary for a set of entries.
pub fn summarize<'a, I>(entries: I) -> Result<IndexSummary, FormatError>
where
    I: IntoIterator<Item = &'a IndexEntry>,
{
    let mut builder = IndexTreeBuilder::new(".");
    let mut test_count = 0usize;
    let mut formats = BTreeSet::new();
    let mut forks = BTreeSet::new();
    for entry in entries {
        test_count += 1;
        builder.insert(entry)?;
        formats.extend(entry.format.iter().cloned());
        forks.extend(entry.fork.iter().cloned());
    }
    Ok(IndexSummary {
        test_count,
        root_hash: builder.finish().digest().to_prefixed_hex(),
        fixture_formats: formats.into_iter().collect(),
        forks: forks.into_iter().collect(),
    })
}

fn scan(meta: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), StorageError> {
    let mut partials = Vec::new();
    let mut locks = Vec::new();
    if !meta.is_dir() {
        return Ok((partials, locks));
    }

    let walker = WalkDir::new(meta).min_depth(1).max_depth(1).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(meta).to_path_buf();
            StorageError::io(path, io::Error::from(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str().and_then(classify_index_name) {
            Some(true) => partials.push(entry.into_path()),
            Some(false) => locks.push(entry.into_path()),
            None => {}
        }
    }
    Ok((partials, locks))
}

fn read_entries(partials: &[PathBuf]) -> Result<BTreeMap<(String, String), IndexEntry>, ApiError> {
    let mut entries = BTreeMap::new();
    for partial in partials {
        let file = File::open(partial).map_err(|e| StorageError::io(partial, e))?;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| StorageError::io(partial, e))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry: IndexEntry =
                serde_json::from_str(line).map_err(|e| FormatError::InvalidPartialLine {
                    path: partial.clone(),
                    line: index + 1,
                    reason: e.to_string(),
                })?;
            let key = (entry.json_path.clone(), entry.id.clone());
            if entries.insert(key, entry).is_some() {
                warn!(partial = %partial.display(), line = index + 1, "Duplicate index entry, keeping last");
            }
        }
    }
    Ok(entries)
}
