//! Batch configuration
//!
//! [`GuardConfig`] is what the core consumes. [`ConfigFile`] is the optional
//! `asset-guard.toml` in the project root that overrides the defaults and,
//! when it lists `[[policy]]` entries, replaces the built-in policy table.

use crate::error::{GuardError, GuardResult};
use guard_policy::{NamingConvention, PolicySpec, PolicyTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file name looked up in the project root
pub const CONFIG_FILE_NAME: &str = "asset-guard.toml";

/// Fix script location relative to the project root
pub const SCRIPT_RELATIVE_PATH: &str = ".buildstate/build/fix.sh";

/// Environment variable that forces debug mode
pub const DEBUG_ENV_VAR: &str = "ASSET_GUARD_DEBUG";

/// A directory class whose files may mention asset paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceClass {
    /// Class name (`templates`, `styles`, `scripts`)
    pub name: String,
    /// Directory relative to the project root
    pub dir: PathBuf,
    /// File extensions searched within `dir`, without the dot
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl ReferenceClass {
    /// Create reference class
    #[must_use]
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            extensions: extensions.iter().map(|e| (*e).to_string()).collect(),
        }
    }

    /// Built-in classes: templates, styles and scripts under `src/`
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("templates", "src/templates", &["html", "htm", "jade", "pug", "hbs", "njk"]),
            Self::new("styles", "src/styles", &["css", "scss", "sass", "less", "styl"]),
            Self::new("scripts", "src/scripts", &["js", "jsx", "ts", "tsx", "json"]),
        ]
    }
}

/// Configuration for one validation batch
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Project root; every other path is relative to it
    pub project_root: PathBuf,
    /// Asset tree, relative to the project root
    pub asset_dir: PathBuf,
    /// Directories rewritten when an asset path changes
    pub references: Vec<ReferenceClass>,
    /// Naming convention generation
    pub naming: NamingConvention,
    /// Development build: the whole check is skipped
    pub debug: bool,
    /// GraphicsMagick executable used for probing and conversion
    pub probe_program: String,
}

impl GuardConfig {
    /// Create default configuration for a project
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            asset_dir: PathBuf::from("src/assets"),
            references: ReferenceClass::defaults(),
            naming: NamingConvention::default(),
            debug: false,
            probe_program: "gm".to_string(),
        }
    }

    /// With asset directory (relative to the project root)
    #[inline]
    #[must_use]
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    /// With naming convention
    #[inline]
    #[must_use]
    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    /// With debug mode
    #[inline]
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// With reference classes
    #[inline]
    #[must_use]
    pub fn with_references(mut self, references: Vec<ReferenceClass>) -> Self {
        self.references = references;
        self
    }

    /// Absolute asset root
    #[must_use]
    pub fn asset_root(&self) -> PathBuf {
        self.project_root.join(&self.asset_dir)
    }

    /// Absolute fix script location
    #[must_use]
    pub fn script_path(&self) -> PathBuf {
        self.project_root.join(SCRIPT_RELATIVE_PATH)
    }

    /// Absolute directory of a reference class
    #[must_use]
    pub fn reference_dir(&self, class: &ReferenceClass) -> PathBuf {
        self.project_root.join(&class.dir)
    }

    /// Reference class by name
    #[must_use]
    pub fn reference(&self, name: &str) -> Option<&ReferenceClass> {
        self.references.iter().find(|c| c.name == name)
    }

    /// Path relative to the asset root, if it lies inside it
    #[must_use]
    pub fn asset_relative(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(self.asset_root())
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    /// Path used for naming checks
    ///
    /// Relative to the asset root when possible, then to the project root,
    /// otherwise just the file name.
    #[must_use]
    pub fn naming_subject(&self, path: &Path) -> String {
        if let Some(rel) = self.asset_relative(path) {
            return to_slash(&rel);
        }
        if let Ok(rel) = path.strip_prefix(&self.project_root) {
            return to_slash(rel);
        }
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Join path components with `/`, the form used inside reference files
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Interpret a debug flag value from the environment
#[must_use]
pub fn parse_debug_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Contents of `asset-guard.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Asset tree relative to the project root
    pub asset_dir: Option<PathBuf>,
    /// Naming convention generation
    pub naming: Option<NamingConvention>,
    /// Skip the whole check
    pub debug: Option<bool>,
    /// GraphicsMagick executable
    pub probe_program: Option<String>,
    /// Reference classes, replacing the defaults when present
    #[serde(rename = "reference")]
    pub references: Vec<ReferenceClass>,
    /// Policy table, replacing the defaults when present
    #[serde(rename = "policy")]
    pub policies: Vec<PolicySpec>,
}

impl ConfigFile {
    /// Parse configuration text; `origin` is used in error messages
    ///
    /// # Errors
    /// Returns [`GuardError::ConfigParse`] on invalid TOML or unknown keys
    pub fn parse(text: &str, origin: impl Into<PathBuf>) -> GuardResult<Self> {
        toml::from_str(text).map_err(|source| GuardError::ConfigParse {
            path: origin.into(),
            source,
        })
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    /// Returns [`GuardError::ConfigRead`] or [`GuardError::ConfigParse`]
    pub fn load(path: &Path) -> GuardResult<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| GuardError::config_read(path, e))?;
        Self::parse(&text, path)
    }

    /// Load `asset-guard.toml` from the project root if it exists
    ///
    /// # Errors
    /// Same as [`ConfigFile::load`]
    pub fn discover(project_root: &Path) -> GuardResult<Option<Self>> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    /// Apply the file on top of the defaults for `project_root`
    ///
    /// # Errors
    /// Returns [`GuardError::Policy`] if a configured policy is invalid
    pub fn resolve(self, project_root: impl Into<PathBuf>) -> GuardResult<(GuardConfig, PolicyTable)> {
        let mut config = GuardConfig::new(project_root);
        if let Some(dir) = self.asset_dir {
            config.asset_dir = dir;
        }
        if let Some(naming) = self.naming {
            config.naming = naming;
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        if let Some(program) = self.probe_program {
            config.probe_program = program;
        }
        if !self.references.is_empty() {
            config.references = self.references;
        }

        let table = if self.policies.is_empty() {
            PolicyTable::defaults()
        } else {
            PolicyTable::from_specs(self.policies)?
        };

        Ok((config, table))
    }
}
