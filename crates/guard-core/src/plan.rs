//! Accumulated fix commands
//!
//! Command groups are keyed by the file's position in the stream, so the
//! script follows stream order no matter in which order probes complete, and
//! each file's commands stay contiguous.

use crate::error::{GuardError, GuardResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Interpreter line written at the top of the script
pub const SHEBANG: &str = "#!/bin/sh";

/// Append-only list of fix commands for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixPlan {
    groups: BTreeMap<u64, Vec<String>>,
}

impl FixPlan {
    /// Create empty plan
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the commands produced for stream entry `seq`
    pub fn append(&mut self, seq: u64, commands: Vec<String>) {
        if commands.is_empty() {
            return;
        }
        self.groups.entry(seq).or_default().extend(commands);
    }

    /// All commands in stream order
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.groups.values().flatten().map(String::as_str)
    }

    /// Number of commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Check if no command was planned
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of files with at least one command
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.len()
    }

    /// Render as a shell script
    #[must_use]
    pub fn to_script(&self) -> String {
        let mut script = String::from(SHEBANG);
        script.push('\n');
        for command in self.commands() {
            script.push_str(command);
            script.push('\n');
        }
        script
    }

    /// Write the script to `path`, replacing any previous content
    ///
    /// Parent directories are created; on Unix the file is made executable.
    ///
    /// # Errors
    /// Returns [`GuardError::ScriptWrite`] on any I/O failure
    pub async fn write_script(&self, path: &Path) -> GuardResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GuardError::script_write(path, e))?;
        }
        tokio::fs::write(path, self.to_script())
            .await
            .map_err(|e| GuardError::script_write(path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
                .await
                .map_err(|e| GuardError::script_write(path, e))?;
        }

        Ok(())
    }
}
