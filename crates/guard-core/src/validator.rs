//! Per-file validation
//!
//! Policies are applied in match order; within a policy the checks run as
//! size, naming, then the image branch. Every violation goes to the warning
//! sink immediately. A single fix slot is kept for the whole pass and the
//! last decision wins, so an opaque-PNG conversion supersedes compression.

use crate::config::GuardConfig;
use crate::fix::FixAction;
use crate::record::FileRecord;
use crate::sink::WarningSink;
use crate::violation::{Violation, ViolationKind};
use guard_policy::{DimensionBounds, Policy};
use guard_probe::{ImageMetadata, ImageProbe};
use std::sync::Arc;

/// Outcome of validating one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Every violation, in policy-then-check order
    pub violations: Vec<Violation>,
    /// Fix decided last, if any
    pub fix: Option<FixAction>,
}

impl Validation {
    /// Check if nothing was found
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    fn propose(&mut self, fix: FixAction) {
        if let Some(previous) = self.fix.replace(fix) {
            tracing::debug!(superseded = previous.name(), "fix replaced");
        }
    }
}

/// Applies policies to files
#[derive(Clone)]
pub struct Validator {
    config: Arc<GuardConfig>,
    probe: Arc<dyn ImageProbe>,
    sink: Arc<dyn WarningSink>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("asset_root", &self.config.asset_root())
            .field("naming", &self.config.naming)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Create validator
    #[must_use]
    pub fn new(
        config: Arc<GuardConfig>,
        probe: Arc<dyn ImageProbe>,
        sink: Arc<dyn WarningSink>,
    ) -> Self {
        Self {
            config,
            probe,
            sink,
        }
    }

    /// Apply `policies` to `record`
    ///
    /// The image is probed at most once, on the first image policy, and a
    /// probe failure is reported once.
    pub async fn validate(&self, record: &FileRecord, policies: &[&Policy]) -> Validation {
        let mut outcome = Validation::default();
        let mut probed: Option<Option<ImageMetadata>> = None;

        for policy in policies {
            let too_big = self.check_size(record, policy, &mut outcome);
            self.check_naming(record, policy, &mut outcome);

            if !policy.image {
                continue;
            }

            if probed.is_none() {
                probed = Some(self.probe(record, &mut outcome).await);
            }
            if let Some(Some(meta)) = &probed {
                self.check_image(record, policy, meta, too_big, &mut outcome);
            }
        }

        outcome
    }

    fn report(&self, outcome: &mut Validation, violation: Violation) {
        self.sink.warn(violation.to_warning());
        outcome.violations.push(violation);
    }

    fn check_size(&self, record: &FileRecord, policy: &Policy, outcome: &mut Validation) -> bool {
        let Some(max) = policy.max_size_bytes else {
            return false;
        };
        let size = record.size_bytes();
        if size < max {
            return false;
        }

        self.report(
            outcome,
            Violation::new(
                record.path(),
                ViolationKind::FileSize,
                format!("File size ({size}) bigger than {max}"),
            ),
        );
        true
    }

    fn check_naming(&self, record: &FileRecord, policy: &Policy, outcome: &mut Validation) {
        if !policy.enforce_naming {
            return;
        }
        let subject = self.config.naming_subject(record.source_path());
        if !self.config.naming.violates(&subject) {
            return;
        }

        self.report(
            outcome,
            Violation::new(
                record.path(),
                ViolationKind::Naming,
                format!(
                    "File name '{subject}' breaks naming convention ({})",
                    self.config.naming.describe()
                ),
            ),
        );
        outcome.propose(FixAction::RenameToConvention(record.source_path().to_path_buf()));
    }

    async fn probe(&self, record: &FileRecord, outcome: &mut Validation) -> Option<ImageMetadata> {
        match self.probe.identify(record.source_path()).await {
            Ok(meta) => Some(meta),
            Err(e) => {
                self.report(
                    outcome,
                    Violation::new(
                        record.path(),
                        ViolationKind::UnreadableImage,
                        format!("Can't open image: {e}"),
                    ),
                );
                None
            }
        }
    }

    fn check_image(
        &self,
        record: &FileRecord,
        policy: &Policy,
        meta: &ImageMetadata,
        too_big: bool,
        outcome: &mut Validation,
    ) {
        let source = record.source_path().to_path_buf();

        if meta.format.is_png() && too_big {
            outcome.propose(FixAction::Compress(source.clone()));
        }

        let bounds = &policy.bounds;
        if bounds.exceeds_max(meta.width, meta.height) {
            self.report(
                outcome,
                Violation::new(
                    record.path(),
                    ViolationKind::DimensionsTooBig,
                    format!(
                        "Image dimensions too big: {}x{} bigger than {}",
                        meta.width,
                        meta.height,
                        max_label(bounds)
                    ),
                ),
            );
        }
        if bounds.under_min(meta.width, meta.height) {
            self.report(
                outcome,
                Violation::new(
                    record.path(),
                    ViolationKind::DimensionsTooSmall,
                    format!(
                        "Image dimensions too small: {}x{} smaller than {}",
                        meta.width,
                        meta.height,
                        min_label(bounds)
                    ),
                ),
            );
        }

        if meta.format.is_png() && meta.is_fully_opaque() {
            self.report(
                outcome,
                Violation::new(
                    record.path(),
                    ViolationKind::OpaqueLossless,
                    "Opaque image saved as lossless format (PNG), JPEG would be smaller",
                ),
            );
            outcome.propose(FixAction::ConvertToOpaqueFormat(source));
        }
    }
}

fn bound_label(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn max_label(bounds: &DimensionBounds) -> String {
    format!("{}x{}", bound_label(bounds.max_width), bound_label(bounds.max_height))
}

fn min_label(bounds: &DimensionBounds) -> String {
    format!("{}x{}", bound_label(bounds.min_width), bound_label(bounds.min_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::Warning;
    use guard_policy::PolicyTable;
    use guard_probe::{ImageFormat, ProbeError};
    use parking_lot::Mutex;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct Collected(Mutex<Vec<Warning>>);

    impl WarningSink for Collected {
        fn warn(&self, warning: Warning) {
            self.0.lock().push(warning);
        }
    }

    struct FixedProbe(Result<ImageMetadata, String>);

    #[async_trait::async_trait]
    impl ImageProbe for FixedProbe {
        async fn identify(&self, _path: &Path) -> Result<ImageMetadata, ProbeError> {
            self.0.clone().map_err(ProbeError::Other)
        }
    }

    const ROOT: &str = "/site";

    fn asset(rel: &str) -> PathBuf {
        Path::new(ROOT).join("src/assets").join(rel)
    }

    fn validator(probe: Result<ImageMetadata, String>) -> (Validator, Arc<Collected>) {
        let sink = Arc::new(Collected::default());
        let v = Validator::new(
            Arc::new(GuardConfig::new(ROOT)),
            Arc::new(FixedProbe(probe)),
            sink.clone(),
        );
        (v, sink)
    }

    async fn run(v: &Validator, table: &PolicyTable, record: &FileRecord) -> Validation {
        let key = record.match_key();
        let policies = table.matching(&key);
        v.validate(record, &policies).await
    }

    fn kinds(outcome: &Validation) -> Vec<ViolationKind> {
        outcome.violations.iter().map(|v| v.kind).collect()
    }

    #[tokio::test]
    async fn oversized_translucent_png_is_compressed() {
        let meta = ImageMetadata::new(ImageFormat::Png, 500, 400).with_opacity_minimum("(0.501961)");
        let (v, sink) = validator(Ok(meta));
        let record = FileRecord::new(asset("img/logo.png"), 2_000_000);

        let outcome = run(&v, &PolicyTable::defaults(), &record).await;

        assert_eq!(kinds(&outcome), vec![ViolationKind::FileSize]);
        assert_eq!(
            outcome.violations[0].message,
            "File size (2000000) bigger than 1000000"
        );
        assert_eq!(outcome.fix, Some(FixAction::Compress(asset("img/logo.png"))));
        assert_eq!(sink.0.lock().len(), 1);
    }

    #[tokio::test]
    async fn opaque_png_is_converted() {
        let (v, _) = validator(Ok(ImageMetadata::new(ImageFormat::Png, 100, 100)));
        let record = FileRecord::new(asset("img/flat.png"), 500_000);

        let outcome = run(&v, &PolicyTable::defaults(), &record).await;

        assert_eq!(kinds(&outcome), vec![ViolationKind::OpaqueLossless]);
        assert_eq!(
            outcome.fix,
            Some(FixAction::ConvertToOpaqueFormat(asset("img/flat.png")))
        );
    }

    #[tokio::test]
    async fn conversion_supersedes_compression() {
        let meta = ImageMetadata::new(ImageFormat::Png, 10, 10).with_opacity_minimum("255 (1.0000)");
        let (v, _) = validator(Ok(meta));
        let record = FileRecord::new(asset("big.png"), 5_000_000);

        let outcome = run(&v, &PolicyTable::defaults(), &record).await;

        assert_eq!(
            kinds(&outcome),
            vec![ViolationKind::FileSize, ViolationKind::OpaqueLossless]
        );
        assert!(matches!(outcome.fix, Some(FixAction::ConvertToOpaqueFormat(_))));
    }

    #[tokio::test]
    async fn jpeg_never_gets_png_fixes() {
        let (v, _) = validator(Ok(ImageMetadata::new(ImageFormat::Jpeg, 4000, 100)));
        let record = FileRecord::new(asset("photo.jpg"), 3_000_000);

        let outcome = run(&v, &PolicyTable::defaults(), &record).await;

        assert_eq!(
            kinds(&outcome),
            vec![ViolationKind::FileSize, ViolationKind::DimensionsTooBig]
        );
        assert_eq!(
            outcome.violations[1].message,
            "Image dimensions too big: 4000x100 bigger than 2048x1536"
        );
        assert_eq!(outcome.fix, None);
    }

    #[tokio::test]
    async fn legacy_min_bounds() {
        let (v, _) = validator(Ok(ImageMetadata::new(ImageFormat::Jpeg, 320, 240)));
        let record = FileRecord::new(asset("thumb.jpg"), 1_000);

        let outcome = run(&v, &PolicyTable::legacy(), &record).await;

        assert_eq!(kinds(&outcome), vec![ViolationKind::DimensionsTooSmall]);
        assert_eq!(
            outcome.violations[0].message,
            "Image dimensions too small: 320x240 smaller than 640x480"
        );
    }

    #[tokio::test]
    async fn probe_failure_is_single_violation() {
        let (v, sink) = validator(Err("Improper image header".into()));
        let record = FileRecord::new(asset("broken.png"), 10);

        let outcome = run(&v, &PolicyTable::defaults(), &record).await;

        assert_eq!(kinds(&outcome), vec![ViolationKind::UnreadableImage]);
        assert!(outcome.violations[0].message.contains("Improper image header"));
        assert_eq!(outcome.fix, None);
        assert_eq!(sink.0.lock().len(), 1);
    }

    #[tokio::test]
    async fn overlapping_image_policies_share_one_probe() {
        let mut table = PolicyTable::new();
        table.push(Policy::new(r"\.png$").unwrap().image().with_max_dimensions(100, 100));
        table.push(Policy::new(r"^/site/src/assets/img/").unwrap().image().with_min_dimensions(10, 10));
        let (v, sink) = validator(Err("Improper image header".into()));
        let record = FileRecord::new(asset("img/broken.png"), 10);

        let outcome = run(&v, &table, &record).await;

        assert_eq!(kinds(&outcome), vec![ViolationKind::UnreadableImage]);
        assert_eq!(sink.0.lock().len(), 1);
        assert_eq!(outcome.fix, None);
    }

    #[tokio::test]
    async fn svg_has_size_check_only() {
        let (v, _) = validator(Err("must not be probed".into()));
        let record = FileRecord::new(asset("logo.svg"), 2_000_000);

        let outcome = run(&v, &PolicyTable::defaults(), &record).await;

        assert_eq!(kinds(&outcome), vec![ViolationKind::FileSize]);
        assert_eq!(outcome.fix, None);
    }

    #[tokio::test]
    async fn naming_violation_proposes_rename() {
        let (v, _) = validator(Ok(ImageMetadata::new(ImageFormat::Jpeg, 100, 100)));
        let record = FileRecord::new(asset("Photos/My Photo.JPG"), 10);

        let outcome = run(&v, &PolicyTable::defaults(), &record).await;

        assert_eq!(kinds(&outcome), vec![ViolationKind::Naming]);
        assert_eq!(
            outcome.fix,
            Some(FixAction::RenameToConvention(asset("Photos/My Photo.JPG")))
        );
    }

    #[tokio::test]
    async fn exact_limit_counts_as_too_big() {
        let (v, _) = validator(Ok(ImageMetadata::new(ImageFormat::Jpeg, 1, 1)));
        let record = FileRecord::new(asset("a.svg"), 1_000_000);
        let outcome = run(&v, &PolicyTable::defaults(), &record).await;
        assert_eq!(kinds(&outcome), vec![ViolationKind::FileSize]);
    }

    #[tokio::test]
    async fn unbounded_image_policy_still_probes() {
        let mut table = PolicyTable::new();
        table.push(Policy::new(r"\.png$").unwrap().image());
        let (v, _) = validator(Ok(ImageMetadata::new(ImageFormat::Png, 99_999, 99_999)));
        let record = FileRecord::new(asset("huge.png"), 1);

        let outcome = run(&v, &table, &record).await;

        assert_eq!(kinds(&outcome), vec![ViolationKind::OpaqueLossless]);
    }
}
