//! Ordered policy table
//!
//! Policies are tested in definition order and every match is returned, so a
//! file can be subject to a generic naming policy and a type-specific size
//! policy at the same time.

use crate::error::PolicyError;
use crate::policy::{Policy, PolicySpec};

/// Ordered list of policies
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: Vec<Policy>,
}

impl PolicyTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Build a table from configuration entries, keeping their order
    ///
    /// # Errors
    /// Returns the first [`PolicyError`] produced by an entry
    pub fn from_specs(specs: impl IntoIterator<Item = PolicySpec>) -> Result<Self, PolicyError> {
        let policies = specs
            .into_iter()
            .map(Policy::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { policies })
    }

    /// Built-in table: naming catch-all followed by per-type size rules
    #[must_use]
    pub fn defaults() -> Self {
        let mut table = Self::new();
        table.push(builtin(".*").enforce_naming());
        table.push(
            builtin(r"\.(jpe?g|png)$")
                .with_max_size(1_000_000)
                .image()
                .with_max_dimensions(2048, 1536),
        );
        table.push(builtin(r"\.svg$").with_max_size(1_000_000));
        table.push(builtin(r"\.(mp4|m4v|ogv)$").with_max_size(10_000_000));
        table.push(builtin(r"\.(mp3|ogg|aac|m4a)$").with_max_size(2_000_000));
        table
    }

    /// Earliest rule set: size and dimension bounds only, images bounded below
    #[must_use]
    pub fn legacy() -> Self {
        let mut table = Self::new();
        table.push(
            builtin(r"\.(jpe?g|png)$")
                .with_max_size(1_000_000)
                .image()
                .with_min_dimensions(640, 480)
                .with_max_dimensions(2048, 1536),
        );
        table.push(builtin(r"\.svg$").with_max_size(1_000_000));
        table.push(builtin(r"\.(mp4|m4v|ogv)").with_max_size(10_000_000));
        table.push(builtin(r"\.(mp3|ogg|aac|m4a)").with_max_size(2_000_000));
        table
    }

    /// Append a policy after all existing ones
    #[inline]
    pub fn push(&mut self, policy: Policy) {
        self.policies.push(policy);
    }

    /// Every policy whose pattern matches `path`, in definition order
    #[must_use]
    pub fn matching(&self, path: &str) -> Vec<&Policy> {
        self.policies.iter().filter(|p| p.is_match(path)).collect()
    }

    /// Iterate over all policies
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter()
    }

    /// Number of policies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if the table has no policies
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Serializable view of the table
    #[must_use]
    pub fn to_specs(&self) -> Vec<PolicySpec> {
        self.policies.iter().map(Policy::to_spec).collect()
    }
}

fn builtin(pattern: &str) -> Policy {
    Policy::new(pattern).expect("built-in policy patterns are valid")
}
