//! Structured generation client.
//!
//! Wraps an injected [`GenerationBackend`] (the external language model)
//! with contract-schema prompting, validation-failure retry with feedback,
//! and transport backoff. The backend is a constructor argument, never a
//! module-level singleton, so tests inject scripted fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::GenerationError;

/// The external language model boundary: one operation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Complete a prompt pair, returning raw model text.
    ///
    /// Implementations classify provider throttling as
    /// [`GenerationError::RateLimited`] and network failures as
    /// [`GenerationError::Transport`].
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError>;
}

/// The output contract for a structured generation call: a name plus the
/// JSON schema the response must satisfy, rendered into the prompt.
#[derive(Debug, Clone)]
pub struct OutputContract {
    pub name: &'static str,
    pub schema: String,
}

impl OutputContract {
    /// Build a contract from a schemars-deriving type.
    pub fn for_type<T: JsonSchema>(name: &'static str) -> Self {
        let schema = schema_for!(T);
        Self {
            name,
            schema: serde_json::to_string_pretty(&schema)
                .unwrap_or_else(|_| "{}".to_string()),
        }
    }
}

/// Client for validated structured generation.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    max_attempts: u32,
    backoff_base_delay: Duration,
    backoff_max_delay: Duration,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: &PipelineConfig) -> Self {
        Self {
            backend,
            max_attempts: config.max_generation_attempts.max(1),
            backoff_base_delay: config.backoff_base_delay,
            backoff_max_delay: config.backoff_max_delay,
        }
    }

    /// Generate a value of `T`, retrying validation failures with feedback.
    ///
    /// Each retry appends a rendering of the previous parse error to the
    /// prompt so the model can self-correct. Rate-limit signals fail
    /// immediately without consuming retry budget; transport errors are
    /// retried with backoff inside a single attempt. Exhaustion yields
    /// [`GenerationError::Validation`] carrying the attempt count and the
    /// last raw error.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        contract: &OutputContract,
    ) -> Result<T, GenerationError> {
        let base_prompt = format!(
            "{user_prompt}\n\nReturn ONLY a single JSON object matching this {} schema, \
             with no surrounding prose:\n{}",
            contract.name, contract.schema
        );
        let mut prompt = base_prompt.clone();
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            let raw = self.complete_with_backoff(system_prompt, &prompt).await?;
            let text = strip_code_fences(&raw);

            match serde_json::from_str::<T>(text) {
                Ok(value) => {
                    debug!(
                        contract = contract.name,
                        attempt, "Structured generation validated"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    warn!(
                        contract = contract.name,
                        attempt,
                        error = %e,
                        "Structured output failed validation"
                    );
                    last_error = e.to_string();
                    prompt = format!(
                        "{base_prompt}\n\nYour previous response was not valid: {last_error}\n\
                         Correct the response and return ONLY the JSON object."
                    );
                }
            }
        }

        Err(GenerationError::Validation {
            attempts: self.max_attempts,
            last_error,
        })
    }

    /// One backend call with transport backoff.
    ///
    /// Rate-limit errors surface immediately; transport errors retry up to
    /// the attempt bound with exponentially increasing delay (doubling,
    /// capped).
    async fn complete_with_backoff(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError> {
        let mut attempt = 0u32;
        loop {
            match self.backend.complete(system_prompt, user_prompt).await {
                Ok(text) if text.trim().is_empty() => {
                    return Err(GenerationError::Empty);
                }
                Ok(text) => return Ok(text),
                Err(e) if e.is_rate_limited() => return Err(e),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    attempt += 1;
                    let delay = self.delay_for_attempt(attempt);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transport error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.backoff_base_delay.saturating_mul(2u32.pow(attempt));
        delay.min(self.backoff_max_delay)
    }
}

/// Strip markdown code fences the model sometimes wraps JSON in.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Mutex;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Echo {
        message: String,
    }

    /// Backend that replays a scripted sequence of responses.
    struct ScriptedBackend {
        responses: Mutex<Vec<Result<String, GenerationError>>>,
        prompts_seen: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                prompts_seen: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn complete(
            &self,
            _system_prompt: &str,
            user_prompt: &str,
        ) -> Result<String, GenerationError> {
            self.prompts_seen
                .lock()
                .unwrap()
                .push(user_prompt.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(GenerationError::Empty);
            }
            responses.remove(0)
        }
    }

    fn client(backend: ScriptedBackend) -> GenerationClient {
        client_arc(Arc::new(backend))
    }

    fn client_arc(backend: Arc<ScriptedBackend>) -> GenerationClient {
        let config = PipelineConfig {
            backoff_base_delay: Duration::from_millis(1),
            ..PipelineConfig::default()
        };
        GenerationClient::new(backend, &config)
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[tokio::test]
    async fn test_generate_valid_first_attempt() {
        let backend = ScriptedBackend::new(vec![Ok(r#"{"message": "hi"}"#.to_string())]);
        let contract = OutputContract::for_type::<Echo>("Echo");
        let result: Echo = client(backend)
            .generate("system", "say hi", &contract)
            .await
            .unwrap();
        assert_eq!(result.message, "hi");
    }

    #[tokio::test]
    async fn test_generate_retries_with_error_feedback() {
        let backend = ScriptedBackend::new(vec![
            Ok("not json at all".to_string()),
            Ok(r#"{"message": "fixed"}"#.to_string()),
        ]);
        let contract = OutputContract::for_type::<Echo>("Echo");
        let result: Echo = client(backend)
            .generate("system", "say hi", &contract)
            .await
            .unwrap();
        assert_eq!(result.message, "fixed");
    }

    #[tokio::test]
    async fn test_retry_prompt_carries_validation_feedback() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("oops".to_string()),
            Ok(r#"{"message": "ok"}"#.to_string()),
        ]));
        let contract = OutputContract::for_type::<Echo>("Echo");

        let _: Echo = client_arc(backend.clone())
            .generate("system", "say hi", &contract)
            .await
            .unwrap();

        let prompts = backend.prompts_seen.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("previous response was not valid"));
    }

    #[tokio::test]
    async fn test_rate_limit_fails_immediately() {
        let backend = ScriptedBackend::new(vec![
            Err(GenerationError::rate_limited("429 quota exceeded")),
            Ok(r#"{"message": "never reached"}"#.to_string()),
        ]);
        let contract = OutputContract::for_type::<Echo>("Echo");
        let err = client(backend)
            .generate::<Echo>("system", "say hi", &contract)
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let backend = ScriptedBackend::new(vec![
            Err(GenerationError::transport("connection reset")),
            Ok(r#"{"message": "recovered"}"#.to_string()),
        ]);
        let contract = OutputContract::for_type::<Echo>("Echo");
        let result: Echo = client(backend)
            .generate("system", "say hi", &contract)
            .await
            .unwrap();
        assert_eq!(result.message, "recovered");
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempts_and_last_error() {
        let backend = ScriptedBackend::new(vec![
            Ok("bad one".to_string()),
            Ok("bad two".to_string()),
            Ok("bad three".to_string()),
        ]);
        let contract = OutputContract::for_type::<Echo>("Echo");
        let err = client(backend)
            .generate::<Echo>("system", "say hi", &contract)
            .await
            .unwrap_err();
        match err {
            GenerationError::Validation {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(!last_error.is_empty());
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
    }
}
