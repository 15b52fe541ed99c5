//! Anthropic Messages API backend

pub mod types;

use crate::prompt::{SYSTEM_PROMPT, render_prompt};
use async_trait::async_trait;
use copy_refinery_core::{CandidateGenerator, GenerationFailure, GenerationRequest};
use reqwest::{Client, StatusCode};
use types::{DEFAULT_MODEL, Message, MessagesRequest, MessagesResponse};

/// Default Messages API base URL
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Candidate generator backed by the Anthropic Messages API
#[derive(Clone)]
pub struct AnthropicGenerator {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl std::fmt::Debug for AnthropicGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicGenerator")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl AnthropicGenerator {
    /// Create a generator with API key from environment
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailure::Misconfigured` if `ANTHROPIC_API_KEY` is
    /// not set
    pub fn from_env() -> Result<Self, GenerationFailure> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            GenerationFailure::Misconfigured("missing ANTHROPIC_API_KEY environment variable".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Create a generator with an explicit API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: None,
        }
    }

    /// Builder: Set API base URL
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: Set model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: Set max tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
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

    async fn messages(&self, request: &MessagesRequest) -> Result<MessagesResponse, GenerationFailure> {
        let response = self
            .client
            .post(format!("{}/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationFailure::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<MessagesResponse>()
                .await
                .map_err(|e| GenerationFailure::Malformed(e.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(GenerationFailure::RateLimited),
            StatusCode::UNAUTHORIZED => Err(GenerationFailure::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GenerationFailure::Rejected {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

#[async_trait]
impl CandidateGenerator for AnthropicGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        let body = MessagesRequest {
            model: self.model.clone(),
            messages: vec![Message::user(render_prompt(request))],
            max_tokens: self.max_tokens,
            system: Some(SYSTEM_PROMPT.to_string()),
            temperature: self.temperature,
        };

        let response = self.messages(&body).await?;
        let text = response.text().trim().to_string();
        if text.is_empty() {
            return Err(GenerationFailure::EmptyOutput);
        }

        tracing::debug!(
            model = %self.model,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            chars = text.len(),
            "anthropic candidate generated"
        );
        Ok(text)
    }
}
