//! Records of vendor calls that failed without aborting the run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Step of the three-call push sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushStep {
    /// `POST .../files` for an upload location.
    FileContainer,
    /// `PUT {uploadUri}` with the batch body.
    Upload,
    /// `PUT .../documents/batch?fileId=...`.
    Commit,
}

impl fmt::Display for PushStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PushStep::FileContainer => "file container",
            PushStep::Upload => "upload",
            PushStep::Commit => "batch commit",
        };
        f.write_str(name)
    }
}

/// A non-success HTTP response that was logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A push step failed for batch `batch` (0-indexed).
    Push {
        batch: usize,
        step: PushStep,
        status: u16,
        body: String,
    },
    /// A query was rejected and is missing from the results.
    Query {
        query_id: String,
        status: u16,
        body: String,
    },
}

impl Diagnostic {
    pub fn status(&self) -> u16 {
        match self {
            Diagnostic::Push { status, .. } | Diagnostic::Query { status, .. } => *status,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Diagnostic::Push { body, .. } | Diagnostic::Query { body, .. } => body,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Push {
                batch,
                step,
                status,
                body,
            } => write!(f, "batch {} {} failed ({}): {}", batch, step, status, body),
            Diagnostic::Query {
                query_id,
                status,
                body,
            } => write!(f, "query '{}' failed ({}): {}", query_id, status, body),
        }
    }
}
