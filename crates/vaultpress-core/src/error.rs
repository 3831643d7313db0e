//! Error types for the publishing pipeline.
//!
//! All fallible operations return [`Result`], an alias over the [`Error`] enum.
//! Malformed Markdown is never an error: passes leave such input untouched and
//! only configuration, I/O and declarative-format failures surface here.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type shared by every vaultpress crate.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid content path (outside the content root, unknown collection, ...)
    #[error("Invalid path: {reason}")]
    InvalidPath { reason: String },

    /// Declarative input could not be parsed (frontmatter, base configs)
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// A lookup by key found nothing (theme, base file, document)
    #[error("Not found: {key}")]
    NotFound { key: String },

    /// A guarded resource is already being processed
    #[error("Busy: {key}")]
    Busy { key: String },

    /// YAML (de)serialization failure
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create an invalid path error
    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(key: impl Into<String>) -> Self {
        Error::NotFound { key: key.into() }
    }

    /// Create a busy error
    pub fn busy(key: impl Into<String>) -> Self {
        Error::Busy { key: key.into() }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error came from malformed declarative input
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::ParseError { .. } | Error::Yaml(_) | Error::Json(_))
    }
}
