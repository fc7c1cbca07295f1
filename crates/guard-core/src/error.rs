//! Error types for Asset Guard
//!
//! Violations and probe failures are not errors: they are reported and the
//! batch moves on. What remains here is configuration loading and the
//! best-effort script write.

use guard_policy::PolicyError;
use std::path::PathBuf;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// Policy table could not be built
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Configuration file could not be read
    #[error("io error reading {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema
    #[error("invalid configuration in {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Fix script could not be persisted
    #[error("io error writing {path}: {source}")]
    ScriptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GuardError {
    /// Create config read error for path
    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Create script write error for path
    pub fn script_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ScriptWrite {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Asset Guard operations
pub type GuardResult<T> = Result<T, GuardError>;
