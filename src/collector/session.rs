//! Per-worker collection session
//!
//! Buffers artifacts by logical file, keeps every logical file to a single
//! format, records index entries, and hands batches to the Partial Writer.

use crate::collector::writer::PartialWriter;
use crate::config::CollectorConfig;
use crate::error::{ApiError, FormatError};
use crate::index::{IndexEntry, IndexWriter};
use crate::tree::path;
use crate::types::WorkerId;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument};

/// One generated document on its way to a logical file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: String,
    /// Canonical file path relative to the output root; must end in `.json`.
    pub logical_path: PathBuf,
    /// Document already serialized with [`crate::collector::to_document_string`].
    pub document: String,
    pub format: Option<String>,
    pub fork: Option<String>,
    /// Hash the generator declared for this artifact.
    pub hash: Option<String>,
    pub pre_hash: Option<String>,
}

impl Artifact {
    pub fn new(id: impl Into<String>, logical_path: impl Into<PathBuf>, document: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            logical_path: logical_path.into(),
            document: document.into(),
            format: None,
            fork: None,
            hash: None,
            pre_hash: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_fork(mut self, fork: impl Into<String>) -> Self {
        self.fork = Some(fork.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    fn index_entry(&self) -> IndexEntry {
        IndexEntry {
            id: self.id.clone(),
            json_path: path::to_logical_string(&self.logical_path),
            fixture_hash: self.hash.clone(),
            fork: self.fork.clone(),
            format: self.format.clone(),
            pre_hash: self.pre_hash.clone(),
        }
    }
}

/// Something that checks artifacts after generation, such as an external test runner.
pub trait ArtifactConsumer {
    /// Whether artifacts of `format` can be consumed at all. Asked once per batch.
    fn can_consume(&self, format: Option<&str>) -> bool;

    fn consume(
        &mut self,
        logical_path: &Path,
        artifact: &Artifact,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Counts reported by [`Collector::finish`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub artifacts: usize,
    pub logical_files: usize,
    pub flushes: usize,
    /// Index partial written by this session; always present when indexing is on.
    pub index_path: Option<PathBuf>,
}

struct Batch {
    format: Option<String>,
    artifacts: Vec<Artifact>,
}

/// A worker's collection session over one output root.
pub struct Collector {
    writer: PartialWriter,
    index: Option<IndexWriter>,
    flush_interval: usize,
    pending: BTreeMap<PathBuf, Batch>,
    formats: HashMap<PathBuf, Option<String>>,
    index_entries: Vec<IndexEntry>,
    report: SessionReport,
}

impl Collector {
    pub fn new(root: impl Into<PathBuf>, worker: Option<WorkerId>, config: &CollectorConfig) -> Self {
        let root = root.into();
        let index = config
            .generate_index
            .then(|| IndexWriter::new(&root, worker.as_ref()));
        Self {
            writer: PartialWriter::new(root, worker),
            index,
            flush_interval: config.flush_interval,
            pending: BTreeMap::new(),
            formats: HashMap::new(),
            index_entries: Vec::new(),
            report: SessionReport::default(),
        }
    }

    /// Session whose worker id comes from the variable named in `config`.
    pub fn from_env(root: impl Into<PathBuf>, config: &CollectorConfig) -> Result<Self, ApiError> {
        let worker = WorkerId::from_env(&config.worker_env_var)?;
        Ok(Self::new(root, worker, config))
    }

    pub fn worker(&self) -> Option<&WorkerId> {
        self.writer.worker()
    }

    /// Logical files currently buffered.
    pub fn pending_files(&self) -> usize {
        self.pending.len()
    }

    /// Buffer one artifact and return its logical path.
    ///
    /// Fails if the path is not a relative `.json` path or the logical file
    /// already holds artifacts of another format.
    pub fn add(&mut self, artifact: Artifact) -> Result<PathBuf, ApiError> {
        validate_logical_path(&artifact.logical_path)?;
        let logical = artifact.logical_path.clone();

        match self.formats.get(&logical) {
            Some(existing) if *existing != artifact.format => {
                return Err(FormatError::MixedFormats {
                    path: logical,
                    existing: existing.clone().unwrap_or_default(),
                    incoming: artifact.format.clone().unwrap_or_default(),
                }
                .into());
            }
            Some(_) => {}
            None => {
                self.formats.insert(logical.clone(), artifact.format.clone());
            }
        }

        if self.index.is_some() {
            self.index_entries.push(artifact.index_entry());
        }
        self.pending
            .entry(logical.clone())
            .or_insert_with(|| Batch {
                format: artifact.format.clone(),
                artifacts: Vec::new(),
            })
            .artifacts
            .push(artifact);
        self.report.artifacts += 1;

        if self.pending.len() >= self.flush_interval {
            self.flush()?;
        }
        Ok(logical)
    }

    /// Write every buffered artifact and index entry. Returns the artifacts written.
    #[instrument(skip_all)]
    pub fn flush(&mut self) -> Result<usize, ApiError> {
        let mut written = 0usize;
        for (logical, batch) in std::mem::take(&mut self.pending) {
            self.writer.append_batch(
                &logical,
                batch
                    .artifacts
                    .iter()
                    .map(|a| (a.id.as_str(), a.document.as_str())),
            )?;
            written += batch.artifacts.len();
        }
        if let Some(index) = self.index.as_mut() {
            index.append_batch(&self.index_entries)?;
            self.index_entries.clear();
        }
        if written > 0 {
            self.report.flushes += 1;
            debug!(written, "Flushed buffered artifacts");
        }
        Ok(written)
    }

    /// Run `consumer` over the buffered artifacts.
    ///
    /// The capability check happens once per logical file; unsupported batches are
    /// skipped whole. Returns the number of artifacts consumed.
    pub fn verify(&self, consumer: &mut dyn ArtifactConsumer) -> Result<usize, ApiError> {
        let mut consumed = 0usize;
        for (logical, batch) in &self.pending {
            if !consumer.can_consume(batch.format.as_deref()) {
                debug!(logical = %logical.display(), "Consumer skips batch");
                continue;
            }
            for artifact in &batch.artifacts {
                consumer.consume(logical, artifact).map_err(|e| {
                    ApiError::ConsumerFailed(format!("{} in {}: {}", artifact.id, logical.display(), e))
                })?;
                consumed += 1;
            }
        }
        Ok(consumed)
    }

    /// Flush, then close the partial and index logs.
    ///
    /// With indexing on, the index partial exists afterwards even if nothing was
    /// collected, so a run that produced zero artifacts still merges to a summary.
    pub fn finish(mut self) -> Result<SessionReport, ApiError> {
        self.flush()?;
        self.report.logical_files = self.formats.len();
        if let Some(mut index) = self.index.take() {
            index.create()?;
            self.report.index_path = Some(index.path().to_path_buf());
            index.close()?;
        }
        self.writer.close()?;
        info!(
            artifacts = self.report.artifacts,
            logical_files = self.report.logical_files,
            "Collection session finished"
        );
        Ok(self.report)
    }
}

fn validate_logical_path(logical: &Path) -> Result<(), ApiError> {
    let relative = logical
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    let is_json = logical.extension().is_some_and(|ext| ext == "json");
    if relative && is_json && logical.file_name().is_some() {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "logical path {:?} must be a relative .json path",
            logical
        )))
    }
}
