//! Pipeline configuration.

use std::time::Duration;

/// Configuration for the generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum attempts per structured generation call (initial + retries)
    pub max_generation_attempts: u32,
    /// Base delay for transport-error backoff (doubles each attempt)
    pub backoff_base_delay: Duration,
    /// Maximum backoff delay
    pub backoff_max_delay: Duration,
    /// Default quality threshold when the request does not set one
    pub default_min_score: u8,
    /// Default refinement iteration bound when the request does not set one
    pub default_max_refinement_iterations: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_generation_attempts: 3,
            backoff_base_delay: Duration::from_millis(500),
            backoff_max_delay: Duration::from_secs(8),
            default_min_score: 70,
            default_max_refinement_iterations: 2,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_generation_attempts: env_parse("REEL_MAX_GENERATION_ATTEMPTS")
                .unwrap_or(defaults.max_generation_attempts),
            backoff_base_delay: env_parse("REEL_BACKOFF_BASE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff_base_delay),
            backoff_max_delay: env_parse("REEL_BACKOFF_MAX_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff_max_delay),
            default_min_score: env_parse("REEL_DEFAULT_MIN_SCORE")
                .unwrap_or(defaults.default_min_score),
            default_max_refinement_iterations: env_parse("REEL_MAX_REFINEMENT_ITERATIONS")
                .unwrap_or(defaults.default_max_refinement_iterations),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_generation_attempts, 3);
        assert_eq!(config.default_min_score, 70);
        assert_eq!(config.default_max_refinement_iterations, 2);
    }
}
