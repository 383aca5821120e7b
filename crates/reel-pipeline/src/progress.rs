//! Fire-and-forget progress reporting.
//!
//! The callback is purely observational: it is never awaited and never
//! affects control flow. Callers that do not care pass [`ProgressReporter::none`].

use std::sync::Arc;

use tracing::debug;

/// Callback fired with a short human-readable string at stage boundaries.
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Wrapper around an optional progress callback.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    /// Reporter that only logs.
    pub fn none() -> Self {
        Self { callback: None }
    }

    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Emit a progress message.
    pub fn report(&self, message: &str) {
        debug!(progress = %message, "Pipeline progress");
        if let Some(callback) = &self.callback {
            callback(message);
        }
    }
}
