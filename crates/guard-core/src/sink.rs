//! Warning channel
//!
//! Sinks are fire-and-forget: they must not block and must not fail.

use crate::violation::Warning;
use tokio::sync::mpsc;

/// Receiver of warnings emitted during a batch
pub trait WarningSink: Send + Sync {
    /// Deliver one warning
    fn warn(&self, warning: Warning);
}

/// Sink that logs every warning through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, warning: Warning) {
        tracing::warn!(file = %warning.file.display(), "{}", warning.message);
    }
}

/// Forward warnings to a single consumer task
impl WarningSink for mpsc::UnboundedSender<Warning> {
    fn warn(&self, warning: Warning) {
        // receiver gone means nobody is listening any more
        let _ = self.send(warning);
    }
}
