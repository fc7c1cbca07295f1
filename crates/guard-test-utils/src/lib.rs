//! Testing utilities for asset-guard workspace
//!
//! Scripted probes, recording sinks and record builders shared by the
//! integration tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use guard_core::{BatchCoordinator, FileRecord, GuardConfig, Warning, WarningSink};
use guard_policy::PolicyTable;
use guard_probe::{ImageFormat, ImageMetadata, ImageProbe, ProbeError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Asset directory used by [`test_config`]
pub const ASSET_DIR: &str = "src/assets";

#[derive(Debug, Clone)]
struct Scripted {
    response: Result<ImageMetadata, String>,
    delay: Option<Duration>,
}

/// Probe answering from a table keyed by path
///
/// Unknown paths fail with `no such image`. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    answers: HashMap<PathBuf, Scripted>,
    calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, meta: ImageMetadata) -> Self {
        self.answers.insert(
            path.into(),
            Scripted {
                response: Ok(meta),
                delay: None,
            },
        );
        self
    }

    pub fn with_delayed(mut self, path: impl Into<PathBuf>, meta: ImageMetadata, delay: Duration) -> Self {
        self.answers.insert(
            path.into(),
            Scripted {
                response: Ok(meta),
                delay: Some(delay),
            },
        );
        self
    }

    pub fn failing(mut self, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        self.answers.insert(
            path.into(),
            Scripted {
                response: Err(reason.into()),
                delay: None,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ImageProbe for ScriptedProbe {
    async fn identify(&self, path: &Path) -> Result<ImageMetadata, ProbeError> {
        self.calls.lock().push(path.to_path_buf());

        let Some(scripted) = self.answers.get(path).cloned() else {
            return Err(ProbeError::Other(format!("no such image: {}", path.display())));
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.response.map_err(ProbeError::Other)
    }
}

/// Sink keeping every warning in arrival order
#[derive(Debug, Default)]
pub struct RecordingSink {
    warnings: Mutex<Vec<Warning>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.warnings.lock().iter().map(|w| w.message.clone()).collect()
    }

    pub fn for_file(&self, file: &Path) -> Vec<String> {
        self.warnings
            .lock()
            .iter()
            .filter(|w| w.file == file)
            .map(|w| w.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.warnings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.lock().is_empty()
    }
}

impl WarningSink for RecordingSink {
    fn warn(&self, warning: Warning) {
        self.warnings.lock().push(warning);
    }
}

/// Configuration rooted at `root` with default asset dir and references
pub fn test_config(root: &Path) -> GuardConfig {
    GuardConfig::new(root)
}

/// Path of `relative` under the asset root of `root`
pub fn asset_path(root: &Path, relative: &str) -> PathBuf {
    root.join(ASSET_DIR).join(relative)
}

/// Regular file record under the asset root
pub fn asset_record(root: &Path, relative: &str, size_bytes: u64) -> FileRecord {
    FileRecord::new(asset_path(root, relative), size_bytes)
}

/// PNG with a translucent pixel
pub fn translucent_png(width: u32, height: u32) -> ImageMetadata {
    ImageMetadata::new(ImageFormat::Png, width, height).with_opacity_minimum("0.00 (0.0000)")
}

/// PNG without any transparency
pub fn opaque_png(width: u32, height: u32) -> ImageMetadata {
    ImageMetadata::new(ImageFormat::Png, width, height).with_opacity_minimum("255.00 (1.0000)")
}

/// Plain JPEG
pub fn jpeg(width: u32, height: u32) -> ImageMetadata {
    ImageMetadata::new(ImageFormat::Jpeg, width, height)
}

/// Coordinator over the default policy table
pub fn coordinator(config: GuardConfig, probe: Arc<ScriptedProbe>) -> (BatchCoordinator, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let batch = BatchCoordinator::new(config, PolicyTable::defaults(), probe, sink.clone());
    (batch, sink)
}
