//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while loading or saving rule state
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Rule file not found at the specified path
    #[error("Rule file not found: {path}")]
    NotFound { path: PathBuf },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON encoding or decoding error
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored snapshot has a format this build does not understand
    #[error("Unsupported snapshot version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },
}
