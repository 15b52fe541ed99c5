//! Local Ollama backend (`/api/generate`)

use crate::prompt::{SYSTEM_PROMPT, render_prompt};
use async_trait::async_trait;
use copy_refinery_core::{CandidateGenerator, GenerationFailure, GenerationRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Default Ollama server
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default local model
pub const DEFAULT_MODEL: &str = "llama3";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    system: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Candidate generator backed by a local Ollama server
#[derive(Clone, Debug)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaGenerator {
    /// Create a generator for `model` on the default local server
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    /// Builder: Set server base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: Set sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Model in use
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

#[async_trait]
impl CandidateGenerator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: render_prompt(request),
            system: SYSTEM_PROMPT,
            stream: false,
            options: self.temperature.map(|temperature| GenerateOptions { temperature }),
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationFailure::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationFailure::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| GenerationFailure::Malformed(e.to_string()))?;

        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(GenerationFailure::EmptyOutput);
        }

        tracing::debug!(model = %self.model, chars = text.len(), "ollama candidate generated");
        Ok(text.to_string())
    }
}
