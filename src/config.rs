//! Configuration System
//!
//! Layered configuration: built-in defaults, then the global file, then the
//! workspace file, then `SHARDFOLD__SECTION__KEY` environment variables.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardfoldConfig {
    /// Artifact collection settings
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for a worker's collection session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Buffered logical files that trigger a flush to partial files (0 writes through)
    #[serde(default = "default_flush_interval")]
    pub flush_interval: usize,

    /// Record an index entry per artifact
    #[serde(default = "default_generate_index")]
    pub generate_index: bool,

    /// Environment variable the scheduler uses to hand out worker ids
    #[serde(default = "default_worker_env_var")]
    pub worker_env_var: String,
}

fn default_flush_interval() -> usize {
    1000
}

fn default_generate_index() -> bool {
    true
}

fn default_worker_env_var() -> String {
    "SHARDFOLD_WORKER_ID".to_string()
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            flush_interval: default_flush_interval(),
            generate_index: default_generate_index(),
            worker_env_var: default_worker_env_var(),
        }
    }
}

impl ShardfoldConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.collector.worker_env_var.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "collector.worker_env_var cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
