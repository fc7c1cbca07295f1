//! Proposed remediations

use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// A not-yet-executed fix for a single file
///
/// At most one is kept per file; a later decision replaces an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "action", content = "path", rename_all = "snake_case")]
pub enum FixAction {
    /// Recompress a PNG losslessly in place
    Compress(PathBuf),
    /// Convert a fully opaque PNG to JPEG
    ConvertToOpaqueFormat(PathBuf),
    /// Rename the file to follow the naming convention
    RenameToConvention(PathBuf),
}

impl FixAction {
    /// File the fix applies to
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Compress(p) | Self::ConvertToOpaqueFormat(p) | Self::RenameToConvention(p) => p,
        }
    }

    /// Check whether applying the fix changes the file's path
    #[inline]
    #[must_use]
    pub fn changes_path(&self) -> bool {
        !matches!(self, Self::Compress(_))
    }

    /// Short name for logs
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compress(_) => "compress",
            Self::ConvertToOpaqueFormat(_) => "convert-to-jpeg",
            Self::RenameToConvention(_) => "rename",
        }
    }
}

impl Display for FixAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.path().display())
    }
}
