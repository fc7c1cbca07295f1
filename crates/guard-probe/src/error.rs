//! Probe failures

use std::path::PathBuf;

/// Errors produced while inspecting an image
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Probe program could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Probe program ran but rejected the file
    #[error("{program} exited with {status} for {path}: {stderr}")]
    Rejected {
        program: String,
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// Output did not contain the expected fields
    #[error("unreadable identify output for {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Probe-specific failure
    #[error("{0}")]
    Other(String),
}

impl ProbeError {
    /// Create malformed output error
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
