//! Error types and handling for mapping recomputation

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for remap operations
///
/// Only top-level input problems surface here. Per-field anomalies (unknown
/// actions, missing action info, dangling copy partners) are folded into the
/// result set instead.
#[derive(Debug, Error)]
pub enum RemapError {
    /// The manual-entries document does not have the expected shape
    #[error("Malformed manual entries: {message}")]
    MalformedManualEntries { message: String },

    /// The field snapshot handed in by the comparison step could not be read
    #[error("Malformed snapshot: {message}")]
    MalformedSnapshot { message: String },

    /// The same path appears twice in one field tree
    #[error("Duplicate field path '{path}'")]
    DuplicateField { path: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON or YAML document could not be decoded
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl RemapError {
    /// Create a malformed manual entries error
    pub fn malformed_manual_entries(message: impl Into<String>) -> Self {
        Self::MalformedManualEntries {
            message: message.into(),
        }
    }

    /// Create a malformed snapshot error
    pub fn malformed_snapshot(message: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            message: message.into(),
        }
    }

    /// Create a duplicate field error
    pub fn duplicate_field(path: impl Into<String>) -> Self {
        Self::DuplicateField { path: path.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for RemapError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
        }
    }
}
