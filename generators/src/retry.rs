//! Retry policies and timeout handling for generator calls
//!
//! Provides configurable retry policies with timeouts:
//! - No retry (fail immediately)
//! - Fixed retry (constant delay between attempts)
//! - Exponential backoff (increasing delay between attempts)
//!
//! Retries live here, at the edge. The refinement loop never retries: a
//! failure that survives this wrapper ends the run with its best so far.

use async_trait::async_trait;
use copy_refinery_core::{CandidateGenerator, GenerationFailure, GenerationRequest};
use std::time::Duration;

/// Retry policy for generator calls
#[derive(Debug, Clone, PartialEq)]
pub enum RetryPolicy {
    /// No retry - fail immediately on error
    None,

    /// Fixed retry with constant delay
    ///
    /// Makes up to `attempts` calls with a fixed `delay` between them.
    Fixed {
        /// Number of attempts (including the initial attempt)
        attempts: u32,
        /// Delay between attempts
        delay: Duration,
    },

    /// Exponential backoff
    ///
    /// Delays grow as `initial_delay * multiplier ^ retry`.
    Exponential {
        /// Number of attempts (including the initial attempt)
        attempts: u32,
        /// Delay before the first retry
        initial_delay: Duration,
        /// Multiplier for exponential growth (typically 2.0)
        multiplier: f64,
    },
}

impl RetryPolicy {
    /// Total attempts this policy allows
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { attempts, .. } | Self::Exponential { attempts, .. } => (*attempts).max(1),
        }
    }

    /// Delay before retry number `retry` (0-based)
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay, .. } => *delay,
            Self::Exponential {
                initial_delay,
                multiplier,
                ..
            } => {
                let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
                initial_delay.mul_f64(multiplier.powi(exponent))
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::Exponential {
            attempts: 3,
            initial_delay: Duration::from_millis(500),
            multiplier: 2.0,
        }
    }
}

/// Retry policy plus per-attempt timeout
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retry policy
    pub policy: RetryPolicy,
    /// Maximum time for a single attempt
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Create a config with no retry
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            policy: RetryPolicy::None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Create a config with fixed retry
    #[must_use]
    pub const fn fixed_retry(attempts: u32, delay: Duration) -> Self {
        Self {
            policy: RetryPolicy::Fixed { attempts, delay },
            timeout: Duration::from_secs(60),
        }
    }

    /// Create a config with exponential backoff
    #[must_use]
    pub const fn exponential_backoff(attempts: u32, initial_delay: Duration) -> Self {
        Self {
            policy: RetryPolicy::Exponential {
                attempts,
                initial_delay,
                multiplier: 2.0,
            },
            timeout: Duration::from_secs(60),
        }
    }

    /// Set timeout duration
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Wraps a generator with per-attempt timeouts and retries
///
/// Empty output is retried like any other failure. `Unauthorized` and
/// `Misconfigured` fail immediately.
#[derive(Debug, Clone)]
pub struct RetryingGenerator<G> {
    inner: G,
    config: RetryConfig,
}

impl<G> RetryingGenerator<G> {
    /// Wrap `inner`
    #[must_use]
    pub const fn new(inner: G, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Retry configuration
    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// The wrapped generator
    #[must_use]
    pub const fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: CandidateGenerator> CandidateGenerator for RetryingGenerator<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        let attempts = self.config.policy.max_attempts();
        let mut attempt = 0;

        loop {
            let outcome = match tokio::time::timeout(self.config.timeout, self.inner.generate(request)).await {
                Ok(result) => result,
                Err(_) => Err(GenerationFailure::TimedOut(self.config.timeout)),
            };

            let failure = match outcome {
                Ok(text) => return Ok(text),
                Err(failure) => failure,
            };

            attempt += 1;
            if attempt >= attempts || !failure.is_retryable() {
                return Err(failure);
            }

            let delay = self.config.policy.delay_for(attempt - 1);
            tracing::warn!(
                attempt,
                max_attempts = attempts,
                ?delay,
                error = %failure,
                "generation attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
