//! A single validation policy bound to a path pattern

use crate::error::PolicyError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pixel bounds for image policies
///
/// Every bound is optional. An image policy with no bounds still probes the
/// file, the dimension comparison is simply a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DimensionBounds {
    /// Smallest accepted width
    pub min_width: Option<u32>,
    /// Smallest accepted height
    pub min_height: Option<u32>,
    /// Largest accepted width
    pub max_width: Option<u32>,
    /// Largest accepted height
    pub max_height: Option<u32>,
}

impl DimensionBounds {
    /// Check whether `width x height` exceeds a maximum bound
    #[inline]
    #[must_use]
    pub fn exceeds_max(&self, width: u32, height: u32) -> bool {
        self.max_width.is_some_and(|max| width > max)
            || self.max_height.is_some_and(|max| height > max)
    }

    /// Check whether `width x height` falls under a minimum bound
    #[inline]
    #[must_use]
    pub fn under_min(&self, width: u32, height: u32) -> bool {
        self.min_width.is_some_and(|min| width < min)
            || self.min_height.is_some_and(|min| height < min)
    }

    /// Check whether any bound is set
    #[inline]
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.min_width.is_none()
            && self.min_height.is_none()
            && self.max_width.is_none()
            && self.max_height.is_none()
    }
}

/// Validation rules for every path matching `pattern`
#[derive(Debug, Clone)]
pub struct Policy {
    pattern: Regex,
    /// Files this large or larger are reported
    pub max_size_bytes: Option<u64>,
    /// Whether the file is probed as an image
    pub image: bool,
    /// Pixel bounds (image policies only)
    pub bounds: DimensionBounds,
    /// Whether the file name must follow the naming convention
    pub enforce_naming: bool,
}

impl Policy {
    /// Create policy for a regex pattern with no rules attached
    ///
    /// # Errors
    /// Returns [`PolicyError::InvalidPattern`] if `pattern` does not compile
    pub fn new(pattern: &str) -> Result<Self, PolicyError> {
        let pattern =
            Regex::new(pattern).map_err(|e| PolicyError::invalid_pattern(pattern, e))?;
        Ok(Self {
            pattern,
            max_size_bytes: None,
            image: false,
            bounds: DimensionBounds::default(),
            enforce_naming: false,
        })
    }

    /// With maximum size in bytes
    #[inline]
    #[must_use]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = Some(bytes);
        self
    }

    /// Mark as image policy
    #[inline]
    #[must_use]
    pub fn image(mut self) -> Self {
        self.image = true;
        self
    }

    /// With maximum pixel dimensions
    #[inline]
    #[must_use]
    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.bounds.max_width = Some(width);
        self.bounds.max_height = Some(height);
        self
    }

    /// With minimum pixel dimensions
    #[inline]
    #[must_use]
    pub fn with_min_dimensions(mut self, width: u32, height: u32) -> Self {
        self.bounds.min_width = Some(width);
        self.bounds.min_height = Some(height);
        self
    }

    /// Enforce the naming convention
    #[inline]
    #[must_use]
    pub fn enforce_naming(mut self) -> Self {
        self.enforce_naming = true;
        self
    }

    /// Source text of the pattern
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Check whether the policy applies to `path`
    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Convert back into the serializable form
    #[must_use]
    pub fn to_spec(&self) -> PolicySpec {
        PolicySpec {
            pattern: self.pattern().to_string(),
            max_size: self.max_size_bytes,
            image: self.image,
            min_width: self.bounds.min_width,
            min_height: self.bounds.min_height,
            max_width: self.bounds.max_width,
            max_height: self.bounds.max_height,
            file_names: self.enforce_naming,
        }
    }
}

/// Configuration-file form of a [`Policy`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySpec {
    /// Regex tested against the asset path
    pub pattern: String,
    /// Maximum size in bytes
    #[serde(default, alias = "maxSize", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    /// Probe as image
    #[serde(default)]
    pub image: bool,
    /// Minimum width
    #[serde(default, alias = "minWidth", skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    /// Minimum height
    #[serde(default, alias = "minHeight", skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
    /// Maximum width
    #[serde(default, alias = "maxWidth", skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    /// Maximum height
    #[serde(default, alias = "maxHeight", skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    /// Enforce the naming convention
    #[serde(default, alias = "fileNames", alias = "naming")]
    pub file_names: bool,
}

impl TryFrom<PolicySpec> for Policy {
    type Error = PolicyError;

    fn try_from(spec: PolicySpec) -> Result<Self, Self::Error> {
        let bounds = DimensionBounds {
            min_width: spec.min_width,
            min_height: spec.min_height,
            max_width: spec.max_width,
            max_height: spec.max_height,
        };

        for (axis, min, max) in [
            ("width", bounds.min_width, bounds.max_width),
            ("height", bounds.min_height, bounds.max_height),
        ] {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(PolicyError::inconsistent(
                        &spec.pattern,
                        format!("min_{axis} {min} exceeds max_{axis} {max}"),
                    ));
                }
            }
        }

        let mut policy = Policy::new(&spec.pattern)?;
        policy.max_size_bytes = spec.max_size;
        policy.image = spec.image;
        policy.bounds = bounds;
        policy.enforce_naming = spec.file_names;
        Ok(policy)
    }
}
