//! Error types for the Coveo adapter.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, CoveoError>;

/// Errors that can occur while talking to Coveo or reading benchmark data.
///
/// A non-success HTTP status from the vendor is *not* an error: those are
/// recorded as [`crate::diagnostics::Diagnostic`]s and the run continues.
#[derive(Error, Debug)]
pub enum CoveoError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport-level HTTP failure (connection, DNS, body read).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A corpus entry cannot be turned into a vendor payload.
    #[error("Document '{id}' cannot be prepared: {reason}")]
    InvalidDocument { id: String, reason: String },

    /// The vendor answered with data we cannot use.
    #[error("Unexpected response from Coveo: {0}")]
    Protocol(String),

    /// A malformed line in a benchmark dataset file.
    #[error("Malformed dataset file '{path}' at line {line}: {reason}")]
    Dataset {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl CoveoError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_document(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for CoveoError {
    fn from(err: reqwest::Error) -> Self {
        CoveoError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for CoveoError {
    fn from(err: serde_json::Error) -> Self {
        CoveoError::Serialization(err.to_string())
    }
}
