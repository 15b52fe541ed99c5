//! Backend selection and construction

use crate::anthropic::{self, AnthropicGenerator};
use crate::ollama::{self, OllamaGenerator};
use crate::retry::{RetryConfig, RetryPolicy, RetryingGenerator};
use copy_refinery_core::{CandidateGenerator, ConfigError, GenerationFailure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Which text backend to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Anthropic Messages API
    Anthropic,
    /// Local Ollama server
    Ollama,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "ollama" | "local" => Ok(Self::Ollama),
            other => Err(ConfigError::Invalid(format!("unknown backend: {other}"))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend to call
    pub backend: Backend,
    /// Model name (backend default when unset)
    pub model: Option<String>,
    /// Base URL override (backend default when unset)
    pub base_url: Option<String>,
    /// Maximum tokens per request
    pub max_tokens: u32,
    /// Temperature for generation (0.0-1.0)
    pub temperature: f32,
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled each retry
    pub retry_delay_ms: u64,
}

impl LlmConfig {
    /// Validate LLM configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a field is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid("model cannot be empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(
                "temperature must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }

    /// Model that will be used
    #[must_use]
    pub fn resolved_model(&self) -> &str {
        self.model.as_deref().unwrap_or(match self.backend {
            Backend::Anthropic => anthropic::types::DEFAULT_MODEL,
            Backend::Ollama => ollama::DEFAULT_MODEL,
        })
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry behaviour for the configured backend
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        let policy = if self.max_retries == 0 {
            RetryPolicy::None
        } else {
            RetryPolicy::Exponential {
                attempts: self.max_retries.saturating_add(1),
                initial_delay: Duration::from_millis(self.retry_delay_ms),
                multiplier: 2.0,
            }
        };
        RetryConfig {
            policy,
            timeout: self.timeout(),
        }
    }

    /// Build the configured generator, wrapped with timeouts and retries
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailure::Misconfigured` if the Anthropic backend is
    /// selected and `ANTHROPIC_API_KEY` is not set.
    pub fn build(&self) -> Result<Arc<dyn CandidateGenerator>, GenerationFailure> {
        let retry = self.retry_config();
        let model = self.resolved_model().to_string();

        let generator: Arc<dyn CandidateGenerator> = match self.backend {
            Backend::Anthropic => {
                let mut inner = AnthropicGenerator::from_env()?
                    .with_model(model)
                    .with_max_tokens(self.max_tokens)
                    .with_temperature(self.temperature);
                if let Some(url) = &self.base_url {
                    inner = inner.with_api_url(url.as_str());
                }
                Arc::new(RetryingGenerator::new(inner, retry))
            }
            Backend::Ollama => {
                let mut inner = OllamaGenerator::new(model).with_temperature(self.temperature);
                if let Some(url) = &self.base_url {
                    inner = inner.with_base_url(url.as_str());
                }
                Arc::new(RetryingGenerator::new(inner, retry))
            }
        };

        tracing::info!(
            backend = %self.backend,
            model = self.resolved_model(),
            timeout_secs = self.timeout_secs,
            max_retries = self.max_retries,
            "generator backend ready"
        );
        Ok(generator)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Ollama,
            model: None,
            base_url: None,
            max_tokens: 1024,
            temperature: 0.7,
            timeout_secs: 60,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}
