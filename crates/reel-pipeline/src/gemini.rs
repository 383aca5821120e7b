//! Gemini HTTP backend for the generation trait.
//!
//! The pipeline itself never talks to a provider directly; it goes through
//! [`GenerationBackend`]. This module is the one shipped implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{is_rate_limit_signal, GenerationError};
use crate::generation::GenerationBackend;

/// Models tried in order until one answers.
const FALLBACK_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-2.5-pro"];

/// Gemini API backend.
pub struct GeminiBackend {
    api_key: String,
    client: Client,
    models: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiBackend {
    /// Create a backend reading `GEMINI_API_KEY` from the environment.
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GenerationError::transport("GEMINI_API_KEY not set"))?;
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Override the model fallback list.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    async fn call_model(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: user_prompt.to_string(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::transport(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("Gemini returned {status}: {body}");
            if status.as_u16() == 429 || is_rate_limit_signal(&message) {
                return Err(GenerationError::rate_limited(message));
            }
            return Err(GenerationError::transport(message));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::transport(format!("Gemini response unreadable: {e}")))?;

        parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or(GenerationError::Empty)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError> {
        let mut last_error = None;

        for model in &self.models {
            match self.call_model(model, system_prompt, user_prompt).await {
                Ok(text) => {
                    info!(model = %model, "Gemini completion succeeded");
                    return Ok(text);
                }
                // Rate limits apply account-wide; do not burn the other models
                Err(e) if e.is_rate_limited() => return Err(e),
                Err(e) => {
                    warn!(model = %model, error = %e, "Gemini model failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(GenerationError::Empty))
    }
}
