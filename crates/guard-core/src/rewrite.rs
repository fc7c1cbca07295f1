//! Reference rewrites
//!
//! When an asset's path changes, templates, stylesheets and scripts that
//! mention the old asset-relative path are rewritten with `sed`, one `find`
//! invocation per reference class.

use crate::config::{GuardConfig, ReferenceClass};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static MEDIA_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:video|audio)/([^/]+)\.[^./]+$").expect("static regex is valid")
});

/// Class that also receives bare media-name rewrites
const TEMPLATES_CLASS: &str = "templates";

/// Find/replace of one asset-relative path across reference directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRewrite {
    from: String,
    to: String,
}

impl ReferenceRewrite {
    /// Create rewrite from old to new asset-relative path (`/`-separated)
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Old path
    #[inline]
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// New path
    #[inline]
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Expand into shell commands
    ///
    /// One substitution per reference class, then, for `video/<name>.<ext>`
    /// and `audio/<name>.<ext>` paths whose bare name changed, one more
    /// substitution of the bare name against the templates class.
    #[must_use]
    pub fn commands(&self, config: &GuardConfig) -> Vec<String> {
        let mut commands: Vec<String> = config
            .references
            .iter()
            .map(|class| substitute_in(config, class, &self.from, &self.to))
            .collect();

        if let (Some(old_name), Some(new_name)) = (media_name(&self.from), media_name(&self.to)) {
            if old_name != new_name {
                if let Some(templates) = config.reference(TEMPLATES_CLASS) {
                    commands.push(substitute_in(config, templates, old_name, new_name));
                }
            }
        }

        commands
    }
}

fn media_name(relative: &str) -> Option<&str> {
    MEDIA_PATH
        .captures(relative)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn substitute_in(config: &GuardConfig, class: &ReferenceClass, from: &str, to: &str) -> String {
    let dir = config.reference_dir(class);
    let expression = format!("s/{}/{}/g", escape_pattern(from), escape_replacement(to));

    let mut command = format!("find {} -type f", shell_quote_path(&dir));
    if !class.extensions.is_empty() {
        let names: Vec<String> = class
            .extensions
            .iter()
            .map(|ext| format!("-name {}", shell_quote(&format!("*.{ext}"))))
            .collect();
        command.push_str(&format!(" \\( {} \\)", names.join(" -o ")));
    }
    command.push_str(&format!(" -exec sed -i -e {} {{}} +", shell_quote(&expression)));
    command
}

/// Escape text for the pattern side of a sed `s` command
///
/// Path separators and dots are escaped along with the other basic regular
/// expression metacharacters.
#[must_use]
pub fn escape_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if matches!(c, '\\' | '/' | '.' | '*' | '[' | ']' | '^' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape text for the replacement side of a sed `s` command
#[must_use]
pub fn escape_replacement(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if matches!(c, '\\' | '/' | '&') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Quote a word for POSIX `sh`
#[must_use]
pub fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Quote a path for POSIX `sh`
#[must_use]
pub fn shell_quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}
