//! CLI output: error mapping from domain errors to the stable CLI surface.

use crate::error::ApiError;

/// Message printed to standard error for a failed command.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::StorageError(_) => format!("Error: {}", e),
        ApiError::FormatError(_) => format!("Error: Invalid input format - {}", e),
        _ => format!("Error: {}", e),
    }
}

/// Process exit code for a failed command.
///
/// Bad data and bad environment exit differently so operators can tell them apart;
/// 1 is reserved for a comparison that found differences.
pub fn exit_code(e: &ApiError) -> i32 {
    match e {
        ApiError::FormatError(_)
        | ApiError::InvalidInput(_)
        | ApiError::ConfigError(_)
        | ApiError::ConsumerFailed(_) => 2,
        ApiError::StorageError(_) => 3,
        ApiError::NoPartialsFound(_) | ApiError::NoPartialIndexesFound(_) => 4,
    }
}
