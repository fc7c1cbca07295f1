//! Plumbing behind the `asset-guard` binary
//!
//! Loads the project configuration, walks the asset tree into a record
//! stream and renders reports. The binary only parses arguments.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use guard_core::config::{parse_debug_flag, DEBUG_ENV_VAR};
use guard_core::{BatchReport, ConfigFile, FileRecord, GuardConfig};
use guard_policy::{PolicySpec, PolicyTable};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

/// Options of the `check` subcommand that affect configuration
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit configuration file instead of `<project>/asset-guard.toml`
    pub config_path: Option<PathBuf>,
    /// Force debug mode on
    pub debug: bool,
    /// Use the earliest policy generation
    pub legacy_policies: bool,
}

/// Install the global subscriber
///
/// `RUST_LOG` selects the filter, `info` when unset.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Resolve configuration and policy table for `project_root`
///
/// Debug mode is on when `--debug` is given, otherwise when the environment
/// variable says so, otherwise as the configuration file says.
///
/// # Errors
/// Fails on unreadable or invalid configuration
pub fn load_project(
    project_root: &Path,
    options: &LoadOptions,
    env_debug: Option<&str>,
) -> Result<(GuardConfig, PolicyTable)> {
    let file = match &options.config_path {
        Some(path) => Some(
            ConfigFile::load(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
        ),
        None => ConfigFile::discover(project_root)
            .with_context(|| format!("loading configuration from {}", project_root.display()))?,
    };

    let (mut config, mut table) = file
        .unwrap_or_default()
        .resolve(project_root)
        .context("invalid configuration")?;

    if options.legacy_policies {
        table = PolicyTable::legacy();
    }

    if let Some(raw) = env_debug {
        match parse_debug_flag(raw) {
            Some(flag) => config.debug = flag,
            None => tracing::warn!(var = DEBUG_ENV_VAR, value = raw, "ignoring unrecognised debug flag"),
        }
    }
    if options.debug {
        config.debug = true;
    }

    Ok((config, table))
}

/// Every entry below the asset root, in walk order
///
/// Symlinks are followed for metadata only; a dangling link becomes a
/// non-regular record. Unreadable entries are logged and skipped.
#[must_use]
pub fn collect_records(asset_root: &Path) -> Vec<FileRecord> {
    if !asset_root.is_dir() {
        tracing::warn!(path = %asset_root.display(), "asset directory not found");
        return Vec::new();
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(asset_root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        let record = match std::fs::metadata(path) {
            Ok(meta) => FileRecord::from_metadata(path, &meta),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no metadata");
                FileRecord::non_regular(path)
            }
        };
        records.push(record);
    }
    records
}

/// Human-readable batch summary
#[must_use]
pub fn render_report(report: &BatchReport) -> String {
    if report.debug_skipped {
        return "debug mode: asset checks skipped\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} entries, {} checked, {} passed through",
        report.files_seen, report.files_checked, report.passed_through
    );
    let _ = writeln!(out, "{} violations", report.violations);
    if report.failed_tasks > 0 {
        let _ = writeln!(out, "{} checks failed to complete", report.failed_tasks);
    }
    match (&report.script, &report.write_error) {
        (Some(script), _) => {
            let _ = writeln!(
                out,
                "{} fixes, {} commands written to {}",
                report.fixes_planned,
                report.commands,
                script.display()
            );
        }
        (None, Some(error)) => {
            let _ = writeln!(out, "fix script not written: {error}");
        }
        (None, None) => {
            let _ = writeln!(out, "no fixes needed");
        }
    }
    out
}

/// Batch summary as pretty JSON
///
/// # Errors
/// Fails only if serialization fails
pub fn render_report_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("serializing report")
}

#[derive(Serialize)]
struct PolicyListing {
    policy: Vec<PolicySpec>,
}

/// Effective policy table in configuration-file syntax
///
/// # Errors
/// Fails only if serialization fails
pub fn render_policies(table: &PolicyTable) -> Result<String> {
    toml::to_string(&PolicyListing {
        policy: table.to_specs(),
    })
    .context("serializing policies")
}

/// Effective policy table as pretty JSON
///
/// # Errors
/// Fails only if serialization fails
pub fn render_policies_json(table: &PolicyTable) -> Result<String> {
    serde_json::to_string_pretty(&table.to_specs()).context("serializing policies")
}
