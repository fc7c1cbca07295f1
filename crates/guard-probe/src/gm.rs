//! GraphicsMagick-backed probe
//!
//! Runs `gm identify -verbose <file>` and reads the format, geometry and the
//! opacity minimum out of the indented report.

use crate::error::ProbeError;
use crate::metadata::{ImageFormat, ImageMetadata, OpacityStats};
use crate::ImageProbe;
use std::path::Path;
use tokio::process::Command;

/// Probe that shells out to GraphicsMagick (or a compatible `identify`)
#[derive(Debug, Clone)]
pub struct GmIdentifyProbe {
    program: String,
    subcommand: Option<String>,
}

impl GmIdentifyProbe {
    /// Probe using `<program> identify -verbose`
    #[inline]
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            subcommand: Some("identify".to_string()),
        }
    }

    /// Probe using a standalone `identify` binary such as ImageMagick's
    #[inline]
    #[must_use]
    pub fn standalone(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            subcommand: None,
        }
    }

    /// Program name this probe runs
    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for GmIdentifyProbe {
    fn default() -> Self {
        Self::new("gm")
    }
}

#[async_trait::async_trait]
impl ImageProbe for GmIdentifyProbe {
    async fn identify(&self, path: &Path) -> Result<ImageMetadata, ProbeError> {
        let mut cmd = Command::new(&self.program);
        if let Some(sub) = &self.subcommand {
            cmd.arg(sub);
        }
        cmd.arg("-verbose").arg(path).kill_on_drop(true);

        tracing::debug!(program = %self.program, path = %path.display(), "probing image");

        let output = cmd.output().await.map_err(|source| ProbeError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ProbeError::Rejected {
                program: self.program.clone(),
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_verbose_report(path, &String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the indented `identify -verbose` report
///
/// Only the first image of a multi-frame file is considered.
///
/// # Errors
/// Returns [`ProbeError::Malformed`] when `Format` or `Geometry` is missing
/// or unreadable
pub fn parse_verbose_report(path: &Path, report: &str) -> Result<ImageMetadata, ProbeError> {
    let mut sections: Vec<(usize, String)> = Vec::new();
    let mut format = None;
    let mut geometry = None;
    let mut opacity = None;
    let mut images_seen = 0usize;

    for line in report.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        while sections.last().is_some_and(|(level, _)| *level >= indent) {
            sections.pop();
        }

        if indent == 0 && key == "Image" {
            images_seen += 1;
            if images_seen > 1 {
                break;
            }
            continue;
        }

        let in_opacity = matches!(
            sections.as_slice(),
            [.., (_, stats), (_, channel)]
                if stats.eq_ignore_ascii_case("Channel Statistics")
                    && (channel == "Opacity" || channel == "Alpha")
        );

        match key {
            "Format" if sections.is_empty() => {
                let name = value.split_whitespace().next().unwrap_or_default();
                format = Some(ImageFormat::from_name(name));
            }
            "Geometry" if sections.is_empty() => {
                geometry = Some(parse_geometry(value).ok_or_else(|| {
                    ProbeError::malformed(path, format!("bad geometry '{value}'"))
                })?);
            }
            // GraphicsMagick says `Minimum`, ImageMagick says `min`
            "Minimum" | "min" if in_opacity => {
                opacity = Some(OpacityStats::new(value));
            }
            _ => {}
        }

        if value.is_empty() {
            sections.push((indent, key.to_string()));
        }
    }

    let format = format.ok_or_else(|| ProbeError::malformed(path, "missing Format"))?;
    let (width, height) = geometry.ok_or_else(|| ProbeError::malformed(path, "missing Geometry"))?;

    Ok(ImageMetadata {
        format,
        width,
        height,
        opacity,
    })
}

fn parse_geometry(value: &str) -> Option<(u32, u32)> {
    let size = value.split('+').next()?;
    let (w, h) = size.split_once('x')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}
