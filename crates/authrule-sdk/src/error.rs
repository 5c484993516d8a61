//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Loading or saving rule state failed
    #[error("Repository error: {0}")]
    Repository(#[from] authrule_repository::RepositoryError),

    /// Core type error (unknown action or category, serialization)
    #[error("Core error: {0}")]
    Core(#[from] authrule_core::CoreError),

    /// Configuration file could not be parsed
    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No rule with this id
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    /// A rule with this id already exists
    #[error("Rule already exists: {0}")]
    DuplicateRule(String),

    /// Rule definition rejected by validation
    #[error("Invalid rule definition: {0}")]
    InvalidRule(String),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
