//! Error taxonomy for the scoring and refinement core
//!
//! - [`GenerationFailure`]: the text backend could not produce a candidate.
//!   Recoverable: the refinement loop stops early and keeps its best.
//! - [`MetricComputationFailure`]: a metric formula hit degenerate input.
//!   Recovered inside the metric with its neutral default.
//! - [`ConfigError`]: invalid weights or loop bounds. Fatal, raised before a
//!   run starts.
//! - [`ValidationError`]: an input record failed boundary checks.

use std::time::Duration;
use thiserror::Error;

/// The candidate generator could not return usable text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationFailure {
    /// Backend unreachable or transport error
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    /// Backend answered but the text was blank
    #[error("Generator returned empty content")]
    EmptyOutput,

    /// A single attempt exceeded its time budget
    #[error("Generation timed out after {0:?}")]
    TimedOut(Duration),

    /// Backend is throttling requests
    #[error("Rate limited by generator backend")]
    RateLimited,

    /// Credentials were rejected
    #[error("Unauthorized - invalid API key")]
    Unauthorized,

    /// Backend returned a non-success status
    #[error("Generator rejected request (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Body or message returned by the backend
        message: String,
    },

    /// Backend response could not be decoded
    #[error("Malformed generator response: {0}")]
    Malformed(String),

    /// Backend configuration is incomplete (missing key, bad URL)
    #[error("Generator misconfigured: {0}")]
    Misconfigured(String),
}

impl GenerationFailure {
    /// Whether another attempt could succeed
    ///
    /// Rejected credentials and incomplete configuration never fix
    /// themselves between attempts.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unauthorized | Self::Misconfigured(_))
    }
}

/// A metric could not be computed on the given text
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MetricComputationFailure {
    /// Text has no words
    #[error("text contains no words")]
    NoWords,

    /// Text has no sentences
    #[error("text contains no sentences")]
    NoSentences,
}

/// Configuration rejected before a run
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Metric weights must sum to 1.0
    #[error("metric weights must sum to 1.0 (got {sum})")]
    WeightsDoNotSumToOne {
        /// Actual sum of the weights
        sum: f64,
    },

    /// A weight was negative or not finite
    #[error("weight for {metric} must be a finite value >= 0 (got {value})")]
    InvalidWeight {
        /// Metric name
        metric: &'static str,
        /// Offending value
        value: f64,
    },

    /// `max_iterations` must be at least 1
    #[error("max_iterations must be >= 1")]
    ZeroIterations,

    /// `min_improvement` must be finite and non-negative
    #[error("min_improvement must be a finite value >= 0 (got {0})")]
    InvalidMinImprovement(f64),

    /// Keyword density curve parameters are invalid
    #[error("invalid keyword density curve: {0}")]
    InvalidDensityCurve(String),

    /// Saturation threshold must lie in [0, 100]
    #[error("saturation threshold must be within 0..=100 (got {0})")]
    InvalidSaturationThreshold(f64),

    /// Any other invalid setting
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// An input record failed boundary validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
}
