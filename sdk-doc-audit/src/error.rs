//! Error types for the documentation audit.
//!
//! Only input-fatal conditions are errors. Reconciliation findings are
//! reported as [`crate::Issue`]s and never surface through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors that abort an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Reading or writing a file failed.
    #[error("IO error ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API snapshot or navigation file is not valid JSON for its schema.
    #[error("JSON error ({path}): {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The documentation spec is not valid YAML for its schema.
    #[error("YAML error ({path}): {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration file could not be parsed.
    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A targeted edit of the spec document could not be applied.
    #[error("Document edit error: {0}")]
    DocumentEdit(String),

    /// The navigation file does not have the expected shape.
    #[error("Invalid sections file: {0}")]
    InvalidSections(String),

    /// Serializing an output document failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuditError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Io { path: path.into(), source }
    }

    /// Create a document edit error.
    pub fn edit(msg: impl Into<String>) -> Self {
        AuditError::DocumentEdit(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        AuditError::Config(msg.into())
    }
}
