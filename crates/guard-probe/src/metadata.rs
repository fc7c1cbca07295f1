//! Image metadata returned by a probe

use crate::opacity::parse_opacity_minimum;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Encoded image format
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    /// Portable Network Graphics (lossless)
    Png,
    /// JPEG (lossy, opaque)
    Jpeg,
    /// Anything else, by the probe's own name
    Other(String),
}

impl ImageFormat {
    /// Map a probe format name such as `PNG` or `JPEG` to a format
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PNG" | "PNG8" | "PNG24" | "PNG32" | "PNG48" | "PNG64" => Self::Png,
            "JPEG" | "JPG" | "PJPEG" => Self::Jpeg,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Check for PNG
    #[inline]
    #[must_use]
    pub fn is_png(&self) -> bool {
        matches!(self, Self::Png)
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("PNG"),
            Self::Jpeg => f.write_str("JPEG"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Opacity channel statistics, kept in the probe's textual form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpacityStats {
    /// Minimum opacity as reported, e.g. `255.00 (1.0000)`
    pub minimum: String,
}

impl OpacityStats {
    /// Create stats from the reported minimum
    #[inline]
    #[must_use]
    pub fn new(minimum: impl Into<String>) -> Self {
        Self {
            minimum: minimum.into(),
        }
    }
}

/// What a probe knows about one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Encoded format
    pub format: ImageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Opacity channel statistics, absent when the image has no alpha channel
    pub opacity: Option<OpacityStats>,
}

impl ImageMetadata {
    /// Create metadata without opacity statistics
    #[inline]
    #[must_use]
    pub fn new(format: ImageFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            opacity: None,
        }
    }

    /// With opacity minimum as reported by the probe
    #[inline]
    #[must_use]
    pub fn with_opacity_minimum(mut self, minimum: impl Into<String>) -> Self {
        self.opacity = Some(OpacityStats::new(minimum));
        self
    }

    /// Check whether every pixel is fully opaque
    ///
    /// No opacity channel means opaque. A reported minimum counts only if its
    /// parenthesized value is exactly `1.0`; unparsable text is not opaque.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_fully_opaque(&self) -> bool {
        match &self.opacity {
            None => true,
            Some(stats) => parse_opacity_minimum(&stats.minimum) == Some(1.0),
        }
    }
}
