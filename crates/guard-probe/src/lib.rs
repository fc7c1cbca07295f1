//! Asset Guard Image Probe
//!
//! The boundary between the validator and whatever tool inspects image files.
//! Decoding is never done in-process: [`GmIdentifyProbe`] shells out to
//! GraphicsMagick and parses its verbose report.
//!
//! # Example
//!
//! ```rust,ignore
//! use guard_probe::{GmIdentifyProbe, ImageProbe};
//!
//! let probe = GmIdentifyProbe::default();
//! let meta = probe.identify(Path::new("assets/hero.png")).await?;
//! println!("{}x{} {}", meta.width, meta.height, meta.format);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod gm;
mod metadata;
mod opacity;

pub use error::ProbeError;
pub use gm::{parse_verbose_report, GmIdentifyProbe};
pub use metadata::{ImageFormat, ImageMetadata, OpacityStats};
pub use opacity::parse_opacity_minimum;

use std::path::Path;

/// Capability to read format, dimensions and opacity of an image file
///
/// Implementations may be slow and may fail; callers treat every failure as
/// a reportable condition, never as fatal.
#[async_trait::async_trait]
pub trait ImageProbe: Send + Sync {
    /// Inspect the image at `path`
    async fn identify(&self, path: &Path) -> Result<ImageMetadata, ProbeError>;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
