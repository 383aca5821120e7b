//! Pipeline error types.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors from the structured generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend answered, but the output never validated against the
    /// contract within the attempt budget.
    #[error("structured output invalid after {attempts} attempts: {last_error}")]
    Validation { attempts: u32, last_error: String },

    /// Quota or rate-limit signal from the provider. Never retried.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network or timeout failure reaching the backend.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend returned a response with no usable content.
    #[error("empty response from generation backend")]
    Empty,
}

impl GenerationError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Whether this error is a quota/rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GenerationError::RateLimited(_))
    }

    /// Whether the client may retry this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Transport(_) | GenerationError::Empty)
    }
}

/// Errors crossing stage boundaries.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// A stage produced nothing usable. The only error kind that crosses
    /// the orchestrator boundary, as a failed outcome.
    #[error("{stage} stage failed: {reason}")]
    StageFailed { stage: &'static str, reason: String },
}

impl PipelineError {
    pub fn stage_failed(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::StageFailed {
            stage,
            reason: reason.into(),
        }
    }

    /// Whether this error must fail the whole run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineError::StageFailed { .. })
    }
}

/// Pattern-match a provider error message for quota/rate-limit signals.
///
/// Providers phrase throttling many ways; this matches the variants seen in
/// practice (HTTP 429, RESOURCE_EXHAUSTED, "quota exceeded", "rate limit",
/// "too many requests").
pub fn is_rate_limit_signal(message: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(rate.?limit|quota|resource.?exhausted|too many requests|\b429\b)")
            .expect("rate-limit pattern is valid")
    });
    re.is_match(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_signal_matches_provider_phrasings() {
        assert!(is_rate_limit_signal("HTTP 429: Too Many Requests"));
        assert!(is_rate_limit_signal("RESOURCE_EXHAUSTED: quota exceeded"));
        assert!(is_rate_limit_signal("Rate limit reached for model"));
        assert!(is_rate_limit_signal("You exceeded your current quota"));
    }

    #[test]
    fn test_rate_limit_signal_ignores_other_errors() {
        assert!(!is_rate_limit_signal("connection reset by peer"));
        assert!(!is_rate_limit_signal("invalid JSON at line 4"));
        // A 429 embedded in a larger number is not a status code
        assert!(!is_rate_limit_signal("processed 14290 tokens"));
    }

    #[test]
    fn test_generation_error_predicates() {
        assert!(GenerationError::rate_limited("quota").is_rate_limited());
        assert!(!GenerationError::rate_limited("quota").is_retryable());
        assert!(GenerationError::transport("timeout").is_retryable());
        assert!(!GenerationError::Validation {
            attempts: 3,
            last_error: "bad".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_pipeline_error_terminality() {
        let terminal = PipelineError::stage_failed("director", "no plan");
        assert!(terminal.is_terminal());

        let generation: PipelineError = GenerationError::Empty.into();
        assert!(!generation.is_terminal());
    }
}
