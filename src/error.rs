//! Error types for the shardfold merge and hashing pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem and environment errors ("bad environment")
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock {path:?}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Permission denied: {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid worker id {0:?}: must be non-empty without '.' or path separators")]
    InvalidWorkerId(String),
}

impl StorageError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied { path }
        } else {
            StorageError::Io { path, source }
        }
    }
}

/// Malformed input data ("bad data")
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid JSON in {path:?}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected a JSON object at the top level of {path:?}")]
    NotAnObject { path: PathBuf },

    #[error("Expected an object for entry {key:?} in {path:?}")]
    EntryNotObject { path: PathBuf, key: String },

    #[error("Expected '_info.hash' or '_info.generatedTestHash' in {key:?}, json file: {path:?}")]
    MissingHash { path: PathBuf, key: String },

    #[error("Expected hash to be a string in {key:?}, json file: {path:?}")]
    HashNotString { path: PathBuf, key: String },

    #[error("Malformed hex hash {value:?} for {key:?} in {path:?}")]
    InvalidHex {
        path: PathBuf,
        key: String,
        value: String,
    },

    #[error("Invalid record at {path:?} line {line}: {reason}")]
    InvalidPartialLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Index entry {id:?} has an unusable json_path {json_path:?}")]
    InvalidIndexPath { id: String, json_path: String },

    #[error("All artifacts in {path:?} must share one format (have {existing:?}, got {incoming:?})")]
    MixedFormats {
        path: PathBuf,
        existing: String,
        incoming: String,
    },
}

/// Top-level errors surfaced by library operations and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Invalid format: {0}")]
    FormatError(#[from] FormatError),

    #[error("No partial files found under {0:?}")]
    NoPartialsFound(PathBuf),

    #[error("No partial indexes found under {0:?}")]
    NoPartialIndexesFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Consumer failed: {0}")]
    ConsumerFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
