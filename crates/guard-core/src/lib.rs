//! Asset Guard Core
//!
//! Validates build-output assets against their policies and collects the
//! shell commands that would fix what can be fixed automatically.
//!
//! # Architecture
//!
//! ```text
//! file stream → BatchCoordinator → Validator ─→ FixPlanner → FixPlan → fix.sh
//!                     │                │
//!                     │                ├─ PolicyTable (which rules apply)
//!                     │                └─ ImageProbe (format, size, opacity)
//!                     └─ WarningSink (every violation, as it is found)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use guard_core::prelude::*;
//!
//! let config = GuardConfig::new("/srv/site");
//! let mut batch = BatchCoordinator::new(
//!     config,
//!     PolicyTable::defaults(),
//!     Arc::new(GmIdentifyProbe::default()),
//!     Arc::new(TracingSink),
//! );
//!
//! for record in records {
//!     batch.accept(record);
//! }
//! let report = batch.finish().await;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod fix;
pub mod plan;
pub mod planner;
pub mod record;
pub mod rewrite;
pub mod sink;
pub mod validator;
pub mod violation;

// Re-exports for convenience
pub use config::{ConfigFile, GuardConfig, ReferenceClass};
pub use coordinator::{BatchCoordinator, BatchReport};
pub use error::{GuardError, GuardResult};
pub use fix::FixAction;
pub use plan::FixPlan;
pub use planner::FixPlanner;
pub use record::FileRecord;
pub use rewrite::ReferenceRewrite;
pub use sink::{TracingSink, WarningSink};
pub use validator::{Validation, Validator};
pub use violation::{Severity, Violation, ViolationKind, Warning};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a validation batch
    pub use crate::config::{GuardConfig, ReferenceClass};
    pub use crate::coordinator::{BatchCoordinator, BatchReport};
    pub use crate::error::{GuardError, GuardResult};
    pub use crate::fix::FixAction;
    pub use crate::plan::FixPlan;
    pub use crate::record::FileRecord;
    pub use crate::sink::{TracingSink, WarningSink};
    pub use crate::violation::{Violation, ViolationKind, Warning};
    pub use guard_policy::{NamingConvention, Policy, PolicyTable};
    pub use guard_probe::{GmIdentifyProbe, ImageMetadata, ImageProbe};
    pub use std::sync::Arc;
}
