//! Violations and warnings
//!
//! A violation is advisory. It is reported the moment it is found and
//! never stops the stream.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// What rule was broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// File at or above the policy's size limit
    FileSize,
    /// Path breaks the naming convention
    Naming,
    /// Probe could not read the image
    UnreadableImage,
    /// Image wider or taller than allowed
    DimensionsTooBig,
    /// Image narrower or shorter than allowed
    DimensionsTooSmall,
    /// Fully opaque image stored losslessly
    OpaqueLossless,
}

/// Severity; every violation is currently a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Reported, never blocking
    #[default]
    Warning,
}

/// A rule breach found in one file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Violation {
    /// File the violation was found in
    pub file: PathBuf,
    /// Broken rule
    pub kind: ViolationKind,
    /// Self-contained message
    pub message: String,
    /// Severity
    pub severity: Severity,
}

impl Violation {
    /// Create warning-level violation
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// Convert into the form sent to the warning channel
    #[must_use]
    pub fn to_warning(&self) -> Warning {
        Warning::new(self.message.clone(), self.file.clone())
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in {})", self.message, self.file.display())
    }
}

/// Message plus the file it concerns, as delivered to a [`crate::WarningSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Human-readable message
    pub message: String,
    /// File the message is about
    pub file: PathBuf,
}

impl Warning {
    /// Create warning
    #[must_use]
    pub fn new(message: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            message: message.into(),
            file: file.into(),
        }
    }
}
