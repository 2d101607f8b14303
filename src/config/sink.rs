//! Destinations for resolution diagnostics.

use std::fmt::Debug;

/// Receives the aggregate error message when a resolution has failing fields.
///
/// The resolver reports at `error` level when it is about to return an error
/// and at `info` level when errors are being ignored.
pub trait DiagnosticSink: Send + Sync + Debug {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// The default sink: forwards every message to [`tracing`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "envresolve", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "envresolve", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "envresolve", "{message}");
    }
}
