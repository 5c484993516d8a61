//! Error types for Authrule Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown rule action: {0}")]
    UnknownAction(String),

    #[error("Unknown rule category: {0}")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
