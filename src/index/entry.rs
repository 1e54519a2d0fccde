//! Index records and the merged summary document

use serde::{Deserialize, Serialize};

/// Summary of one artifact, written by the worker that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    /// Logical file path relative to the output root, `/`-separated.
    pub json_path: String,
    /// Hash the generator declared for the artifact, if it produced one.
    pub fixture_hash: Option<String>,
    #[serde(default)]
    pub fork: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_hash: Option<String>,
}

impl IndexEntry {
    pub fn new(id: impl Into<String>, json_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            json_path: json_path.into(),
            fixture_hash: None,
            fork: None,
            format: None,
            pre_hash: None,
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.fixture_hash = Some(hash.into());
        self
    }

    pub fn with_fork(mut self, fork: impl Into<String>) -> Self {
        self.fork = Some(fork.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Contents of `.meta/index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Distinct artifacts, including those without a hash.
    pub test_count: usize,
    /// Hash tree root over every entry that has a hash, `0x`-prefixed.
    pub root_hash: String,
    pub fixture_formats: Vec<String>,
    pub forks: Vec<String>,
}
