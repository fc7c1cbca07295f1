//! File stream entries

use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// One entry of the incoming file stream
///
/// `path` is where the file currently lives (possibly a build output),
/// `source_path` is where it came from before any pipeline transform. Probes
/// and fixes operate on the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    source_path: PathBuf,
    size_bytes: u64,
    regular: bool,
}

impl FileRecord {
    /// Regular file whose current and source paths are the same
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        Self {
            source_path: path.clone(),
            path,
            size_bytes,
            regular: true,
        }
    }

    /// Entry that is not a regular file (directory, dangling link)
    #[must_use]
    pub fn non_regular(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            source_path: path.clone(),
            path,
            size_bytes: 0,
            regular: false,
        }
    }

    /// Build from filesystem metadata
    #[must_use]
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        let path = path.into();
        Self {
            source_path: path.clone(),
            path,
            size_bytes: metadata.len(),
            regular: metadata.is_file(),
        }
    }

    /// With original source path
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source_path = source.into();
        self
    }

    /// Current path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original path before any pipeline transform
    #[inline]
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Size in bytes
    #[inline]
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Check if this is a regular file
    #[inline]
    #[must_use]
    pub fn is_regular_file(&self) -> bool {
        self.regular
    }

    /// Current path as text, used for policy matching
    #[must_use]
    pub fn match_key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_defaults_to_path() {
        let record = FileRecord::new("/out/a.png", 10);
        assert_eq!(record.source_path(), Path::new("/out/a.png"));
        assert!(record.is_regular_file());
    }

    #[test]
    fn with_source_keeps_path() {
        let record = FileRecord::new("/out/a.png", 10).with_source("/src/assets/a.png");
        assert_eq!(record.path(), Path::new("/out/a.png"));
        assert_eq!(record.source_path(), Path::new("/src/assets/a.png"));
    }

    #[test]
    fn from_metadata_of_directory() {
        let dir = tempfile::tempdir().unwrap();
        let meta = std::fs::metadata(dir.path()).unwrap();
        let record = FileRecord::from_metadata(dir.path(), &meta);
        assert!(!record.is_regular_file());
    }
}
