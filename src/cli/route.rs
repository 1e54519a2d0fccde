//! CLI route: single route table and run context. Dispatches to library operations and presentation.

use crate::cli::parse::{Commands, HashSelection};
use crate::cli::presentation::format_diff;
use crate::collector::{merge_partials, Artifact, Collector, MergeReport};
use crate::config::{ConfigLoader, ShardfoldConfig};
use crate::error::{ApiError, FormatError, StorageError};
use crate::index::{has_partial_indexes, merge_index};
use crate::tree::{diff, render_report, TreeBuilder};
use crate::types::WorkerId;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Result of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text for standard output
    Success(String),
    /// A comparison found differences; the text describes them
    Differences(String),
}

impl Outcome {
    pub fn text(&self) -> &str {
        match self {
            Outcome::Success(text) | Outcome::Differences(text) => text,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success(_) => 0,
            Outcome::Differences(_) => 1,
        }
    }
}

/// One artifact line read by `collect`.
#[derive(Debug, Deserialize)]
struct ArtifactLine {
    id: String,
    path: String,
    document: serde_json::Value,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    fork: Option<String>,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    pre_hash: Option<String>,
}

/// Runtime context for CLI execution: the loaded configuration.
pub struct RunContext {
    config: ShardfoldConfig,
    color: bool,
}

impl RunContext {
    /// Load configuration from `config_path`, or layered from `workspace_root`.
    pub fn new(workspace_root: &Path, config_path: Option<&Path>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        };
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: ShardfoldConfig) -> Self {
        Self {
            config,
            color: io::stdout().is_terminal(),
        }
    }

    pub fn config(&self) -> &ShardfoldConfig {
        &self.config
    }

    /// Force coloured (or plain) diff output regardless of the terminal.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn execute(&self, command: &Commands) -> Result<Outcome, ApiError> {
        let start = Instant::now();
        let outcome = match command {
            Commands::Hash {
                folder,
                selection,
                name,
            } => self.handle_hash(folder, selection, name.as_deref()),
            Commands::Compare {
                left,
                right,
                selection,
            } => self.handle_compare(left, right, selection),
            Commands::Merge { dir, no_index } => self.handle_merge(dir, *no_index),
            Commands::Collect { dir, worker, input } => {
                self.handle_collect(dir, worker.as_deref(), input.as_deref())
            }
        };
        debug!(duration_ms = start.elapsed().as_millis(), ok = outcome.is_ok(), "Command finished");
        outcome
    }

    fn handle_hash(
        &self,
        folder: &Path,
        selection: &HashSelection,
        name: Option<&str>,
    ) -> Result<Outcome, ApiError> {
        let builder = tree_builder(folder)?;
        let tree = builder.build()?;
        let root_name = name.map(str::to_string).unwrap_or_else(|| builder.root_name());
        let lines = render_report(&tree, &root_name, &selection.report_mode());
        Ok(Outcome::Success(lines.join("\n")))
    }

    fn handle_compare(
        &self,
        left: &Path,
        right: &Path,
        selection: &HashSelection,
    ) -> Result<Outcome, ApiError> {
        let left_tree = tree_builder(left)?.build()?;
        let right_tree = tree_builder(right)?.build()?;

        let entries = diff(&left_tree, &right_tree, &selection.traversal());
        info!(differences = entries.len(), "Comparison completed");
        if entries.is_empty() {
            return Ok(Outcome::Success(String::new()));
        }
        Ok(Outcome::Differences(format_diff(
            &entries,
            &left.display().to_string(),
            &right.display().to_string(),
            self.color,
        )))
    }

    /// Merge partials, then the index.
    ///
    /// No partial files is only an error when there is no index partial either: a
    /// run whose workers produced zero artifacts still leaves empty index partials
    /// and merges to an empty summary.
    fn handle_merge(&self, dir: &Path, no_index: bool) -> Result<Outcome, ApiError> {
        let index = !no_index && self.config.collector.generate_index;
        let report = match merge_partials(dir) {
            Ok(report) => report,
            Err(ApiError::NoPartialsFound(root)) if index && has_partial_indexes(dir) => {
                info!(root = %root.display(), "No artifacts collected, merging index only");
                MergeReport::default()
            }
            Err(e) => return Err(e),
        };
        let mut lines = vec![format!(
            "Merged {} artifacts into {} files",
            report.artifacts, report.targets
        )];
        if index {
            let summary = merge_index(dir)?;
            lines.push(format!(
                "Indexed {} tests, root hash {}",
                summary.test_count, summary.root_hash
            ));
        }
        Ok(Outcome::Success(lines.join("\n")))
    }

    fn handle_collect(
        &self,
        dir: &Path,
        worker: Option<&str>,
        input: Option<&Path>,
    ) -> Result<Outcome, ApiError> {
        let collector_config = &self.config.collector;
        let mut collector = match worker {
            Some(id) => Collector::new(dir, Some(WorkerId::new(id)?), collector_config),
            None => Collector::from_env(dir, collector_config)?,
        };

        let (reader, source): (Box<dyn BufRead>, PathBuf) = match input {
            Some(path) => {
                let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
                (Box::new(BufReader::new(file)), path.to_path_buf())
            }
            None => (Box::new(io::stdin().lock()), PathBuf::from("<stdin>")),
        };

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| StorageError::io(&source, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: ArtifactLine =
                serde_json::from_str(&line).map_err(|e| FormatError::InvalidPartialLine {
                    path: source.clone(),
                    line: index + 1,
                    reason: e.to_string(),
                })?;
            collector.add(artifact_from_line(parsed, &source, index + 1)?)?;
        }

        let report = collector.finish()?;
        Ok(Outcome::Success(format!(
            "Collected {} artifacts into {} files",
            report.artifacts, report.logical_files
        )))
    }
}

fn artifact_from_line(line: ArtifactLine, source: &Path, number: usize) -> Result<Artifact, ApiError> {
    let document = crate::collector::to_document_string(&line.document).map_err(|e| {
        FormatError::InvalidPartialLine {
            path: source.to_path_buf(),
            line: number,
            reason: e.to_string(),
        }
    })?;
    Ok(Artifact {
        id: line.id,
        logical_path: PathBuf::from(line.path),
        document,
        format: line.format,
        fork: line.fork,
        hash: line.hash,
        pre_hash: line.pre_hash,
    })
}

fn tree_builder(folder: &Path) -> Result<TreeBuilder, ApiError> {
    if !folder.is_dir() {
        return Err(ApiError::InvalidInput(format!(
            "{} is not a directory",
            folder.display()
        )));
    }
    Ok(TreeBuilder::new(folder.to_path_buf()))
}
