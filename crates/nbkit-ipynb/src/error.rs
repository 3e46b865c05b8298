//! Error types for notebook loading.

use std::path::PathBuf;

/// Result type for notebook operations.
pub type IpynbResult<T> = Result<T, IpynbError>;

/// Errors that can occur while reading or writing a notebook.
#[derive(Debug, thiserror::Error)]
pub enum IpynbError {
    /// Failed to read the notebook file.
    #[error("Failed to read notebook {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    /// Failed to write the notebook file.
    #[error("Failed to write notebook {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    /// Failed to serialize/deserialize JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The JSON is well-formed but is not a notebook we understand.
    #[error("Invalid notebook: {0}")]
    InvalidNotebook(String),
}
