//! Batch coordination
//!
//! The coordinator accepts files one at a time, runs each regular file's
//! validation as its own task and, once the stream ends, joins every task
//! and writes the fix script.
//!
//! Tasks carry the sequence number of their file, so the finished script
//! lists commands in stream order however the probes interleave.

use crate::config::GuardConfig;
use crate::fix::FixAction;
use crate::plan::FixPlan;
use crate::planner::FixPlanner;
use crate::record::FileRecord;
use crate::sink::WarningSink;
use crate::validator::Validator;
use crate::violation::Warning;
use futures::{pin_mut, Stream, StreamExt};
use guard_policy::PolicyTable;
use guard_probe::ImageProbe;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Summary of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Batch ran in debug mode and did nothing
    pub debug_skipped: bool,
    /// Entries accepted, regular or not
    pub files_seen: usize,
    /// Regular files with at least one matching policy
    pub files_checked: usize,
    /// Entries passed through without validation
    pub passed_through: usize,
    /// Violations reported
    pub violations: usize,
    /// Files that ended up with a fix proposal
    pub fixes_planned: usize,
    /// Commands in the script
    pub commands: usize,
    /// Validation tasks that panicked
    pub failed_tasks: usize,
    /// Script location, when one was written
    pub script: Option<PathBuf>,
    /// Why the script could not be written
    pub write_error: Option<String>,
}

impl BatchReport {
    /// Check if the batch produced no violations
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations == 0
    }
}

/// Result of one file's task
#[derive(Debug)]
struct FileOutcome {
    seq: u64,
    violations: usize,
    fix: Option<FixAction>,
    commands: Vec<String>,
}

/// Drives validation of a stream of files
pub struct BatchCoordinator {
    config: Arc<GuardConfig>,
    table: Arc<PolicyTable>,
    validator: Validator,
    planner: FixPlanner,
    sink: Arc<dyn WarningSink>,
    tasks: JoinSet<FileOutcome>,
    plan: FixPlan,
    next_seq: u64,
    report: BatchReport,
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator")
            .field("project_root", &self.config.project_root)
            .field("policies", &self.table.len())
            .field("outstanding", &self.tasks.len())
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl BatchCoordinator {
    /// Create coordinator for one batch
    #[must_use]
    pub fn new(
        config: GuardConfig,
        table: PolicyTable,
        probe: Arc<dyn ImageProbe>,
        sink: Arc<dyn WarningSink>,
    ) -> Self {
        let config = Arc::new(config);
        let report = BatchReport {
            debug_skipped: config.debug,
            ..BatchReport::default()
        };

        Self {
            validator: Validator::new(Arc::clone(&config), probe, Arc::clone(&sink)),
            planner: FixPlanner::new(Arc::clone(&config)),
            table: Arc::new(table),
            config,
            sink,
            tasks: JoinSet::new(),
            plan: FixPlan::new(),
            next_seq: 0,
            report,
        }
    }

    /// Configuration of this batch
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Accept the next file of the stream
    ///
    /// Validation of regular files is spawned and never awaited here, so
    /// acceptance is not held up by image probes. The record is handed
    /// back unchanged.
    ///
    /// Must be called within a tokio runtime.
    pub fn accept(&mut self, record: FileRecord) -> FileRecord {
        if self.config.debug {
            return record;
        }
        self.report.files_seen += 1;

        if !record.is_regular_file() {
            tracing::trace!(path = %record.path().display(), "not a regular file");
            self.report.passed_through += 1;
            return record;
        }

        let key = record.match_key();
        if self.table.matching(&key).is_empty() {
            self.report.passed_through += 1;
            return record;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.report.files_checked += 1;
        tracing::debug!(seq, path = %record.path().display(), "accepted");

        let validator = self.validator.clone();
        let planner = self.planner.clone();
        let table = Arc::clone(&self.table);
        let job = record.clone();

        self.tasks.spawn(async move {
            let policies = table.matching(&key);
            let outcome = validator.validate(&job, &policies).await;
            let commands = outcome
                .fix
                .as_ref()
                .map(|fix| planner.plan(fix))
                .unwrap_or_default();

            FileOutcome {
                seq,
                violations: outcome.violations.len(),
                fix: outcome.fix,
                commands,
            }
        });

        record
    }

    /// Number of validation tasks not yet joined
    #[inline]
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    fn absorb(&mut self, outcome: FileOutcome) {
        self.report.violations += outcome.violations;
        if let Some(fix) = &outcome.fix {
            tracing::debug!(seq = outcome.seq, %fix, commands = outcome.commands.len(), "fix planned");
            self.report.fixes_planned += 1;
        }
        self.plan.append(outcome.seq, outcome.commands);
    }

    /// Join every outstanding task and write the fix script
    ///
    /// The script is written only if at least one command was planned. A
    /// write failure is logged and recorded in the report.
    pub async fn finish(mut self) -> BatchReport {
        if self.config.debug {
            tracing::debug!("debug mode, asset checks skipped");
            return self.report;
        }

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(outcome) => self.absorb(outcome),
                Err(e) => {
                    tracing::error!(error = %e, "validation task failed");
                    self.report.failed_tasks += 1;
                }
            }
        }

        self.report.commands = self.plan.len();

        if !self.plan.is_empty() {
            let path = self.config.script_path();
            match self.plan.write_script(&path).await {
                Ok(()) => {
                    self.sink.warn(Warning::new(
                        format!(
                            "Fix script with {} commands written, run `sh {}` to apply",
                            self.report.commands,
                            path.display()
                        ),
                        path.clone(),
                    ));
                    self.report.script = Some(path);
                }
                Err(e) => {
                    tracing::error!(error = %e, "fix script not written");
                    self.report.write_error = Some(e.to_string());
                }
            }
        }

        tracing::info!(
            files = self.report.files_seen,
            checked = self.report.files_checked,
            violations = self.report.violations,
            fixes = self.report.fixes_planned,
            commands = self.report.commands,
            "asset check complete"
        );
        self.report
    }

    /// Consume a whole stream
    ///
    /// Returns the entries unchanged, in stream order, with the report.
    pub async fn run<S>(mut self, stream: S) -> (Vec<FileRecord>, BatchReport)
    where
        S: Stream<Item = FileRecord>,
    {
        pin_mut!(stream);
        let mut passed = Vec::new();
        while let Some(record) = stream.next().await {
            passed.push(self.accept(record));
        }
        let report = self.finish().await;
        (passed, report)
    }
}
