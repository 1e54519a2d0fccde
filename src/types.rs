//! Core value types shared across the collector, index and hash tree.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Digest bytes of a hash tree node.
///
/// Leaf digests are whatever the generator declared (any length); interior
/// digests are always 32-byte SHA-256 outputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest(Vec<u8>);

impl Digest {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex with a `0x` prefix, the form used in every report.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_prefixed_hex())
    }
}

/// Granularity of a hash tree node, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Folder,
    File,
    Test,
}

/// Identity of the worker that owns a set of partial files.
///
/// Passed explicitly into writers; the scheduler's environment variable is read
/// once through [`WorkerId::from_env`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerId(String);

impl WorkerId {
    /// Validate and wrap a worker id.
    ///
    /// The id becomes a file name segment, so it may not be empty or contain
    /// `.` or path separators.
    pub fn new(id: impl Into<String>) -> Result<Self, StorageError> {
        let id = id.into();
        if id.is_empty() || id.contains(['.', '/', '\\']) {
            return Err(StorageError::InvalidWorkerId(id));
        }
        Ok(Self(id))
    }

    /// Read the worker id from `var`. An unset or empty variable means single-process mode.
    pub fn from_env(var: &str) -> Result<Option<Self>, StorageError> {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => Self::new(value).map(Some),
            _ => Ok(None),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
