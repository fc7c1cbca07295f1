//! Error types for policy loading

/// Errors raised while building a policy table
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Pattern is not a valid regular expression
    #[error("invalid policy pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Bounds contradict each other
    #[error("policy '{pattern}' has inconsistent bounds: {reason}")]
    InconsistentBounds { pattern: String, reason: String },
}

impl PolicyError {
    /// Create invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create inconsistent bounds error
    pub fn inconsistent(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InconsistentBounds {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
