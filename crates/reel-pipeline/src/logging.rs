//! Structured run logging utilities.
//!
//! Provides consistent, structured logging for generation runs with
//! tracing spans and contextual information.

use tracing::{error, info, warn};

/// Run logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
}

impl RunLogger {
    /// Create a new logger for a generation run.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    /// Log the start of a stage.
    pub fn stage_start(&self, stage: &str) {
        info!(run_id = %self.run_id, stage = %stage, "Stage started");
    }

    /// Log the completion of a stage with its wall time.
    pub fn stage_done(&self, stage: &str, elapsed_ms: u64) {
        info!(
            run_id = %self.run_id,
            stage = %stage,
            elapsed_ms,
            "Stage completed"
        );
    }

    /// Log a non-fatal degradation during the run.
    pub fn degraded(&self, stage: &str, message: &str) {
        warn!(run_id = %self.run_id, stage = %stage, "Run degraded: {}", message);
    }

    /// Log a terminal run failure.
    pub fn failed(&self, stage: &str, message: &str) {
        error!(run_id = %self.run_id, stage = %stage, "Run failed: {}", message);
    }

    /// Get the run id.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_holds_id() {
        let logger = RunLogger::new("run-123");
        assert_eq!(logger.run_id(), "run-123");
    }
}
