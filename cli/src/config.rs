//! Application configuration
//!
//! Layers, lowest to highest precedence:
//!
//! 1. Defaults for the deployment [`Environment`] (from `CONFIG_ENV`)
//! 2. An optional TOML file; any subset of keys may be given
//! 3. `COPY_REFINERY_*` environment variables
//! 4. Command-line flags ([`Overrides`])
//!
//! The result is validated once before anything runs.
//!
//! ```toml
//! [llm]
//! backend = "anthropic"
//! model = "claude-sonnet-4-5-20250929"
//!
//! [refinement]
//! max_iterations = 5
//! min_improvement = 0.25
//!
//! [batch]
//! max_concurrent = 8
//! ```

use copy_refinery_core::{ConfigError, RefinementConfig, ScoringConfig};
use copy_refinery_generators::{Backend, LlmConfig};
use copy_refinery_runtime::BatchConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Why configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// `CONFIG_ENV` named an unknown environment
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// The config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Defaults could not be laid out as TOML for merging
    #[error("Failed to prepare default configuration: {0}")]
    Defaults(#[from] toml::ser::Error),

    /// An environment override had an unusable value
    #[error("Invalid value for {var}: {value}")]
    InvalidOverride {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// The merged configuration failed validation
    #[error("Configuration validation failed: {0}")]
    Invalid(#[from] ConfigError),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Pre-production
    Staging,
    /// Production
    Production,
}

impl FromStr for Environment {
    type Err = ConfigLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigLoadError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Logging and metrics export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
    /// Serve Prometheus metrics while a batch runs
    pub metrics_enabled: bool,
    /// Metrics listener address
    pub metrics_addr: SocketAddr,
}

impl ObservabilityConfig {
    /// Validate observability configuration
    ///
    /// # Errors
    ///
    /// Returns error if the log level is unknown
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "invalid log_level: {}. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 9090)),
        }
    }
}

/// Command-line overrides, applied last
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Generator backend
    pub backend: Option<Backend>,
    /// Model name
    pub model: Option<String>,
    /// Accepted-rewrite budget
    pub max_iterations: Option<u32>,
    /// Plateau threshold in score points
    pub min_improvement: Option<f64>,
    /// Products refined at once
    pub max_concurrent: Option<usize>,
    /// Serve Prometheus metrics
    pub metrics: bool,
}

/// Complete configuration for the `copy-refinery` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Text backend
    #[serde(default)]
    pub llm: LlmConfig,
    /// Metric weights and curves
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Refinement loop bounds
    #[serde(default)]
    pub refinement: RefinementConfig,
    /// Batch concurrency
    #[serde(default)]
    pub batch: BatchConfig,
    /// Logging and metrics
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Defaults for a deployment environment
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        let mut config = Self {
            environment,
            llm: LlmConfig::default(),
            scoring: ScoringConfig::default(),
            refinement: RefinementConfig::default(),
            batch: BatchConfig::default(),
            observability: ObservabilityConfig::default(),
        };

        match environment {
            Environment::Development => {
                config.observability.log_level = "debug".to_string();
                config.batch.max_concurrent = 2;
            }
            Environment::Staging => {
                config.observability.log_level = "info".to_string();
                config.batch.max_concurrent = 4;
            }
            Environment::Production => {
                config.observability.log_level = "warn".to_string();
                config.observability.json_logs = true;
                config.batch.max_concurrent = 8;
            }
        }

        config
    }

    /// Load from the process environment and an optional TOML file
    ///
    /// # Errors
    ///
    /// Returns error if any layer is unreadable or the result is invalid
    pub fn from_env(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        Self::load(path, |key| std::env::var(key).ok())
    }

    /// Load using `lookup` for environment variables
    ///
    /// # Errors
    ///
    /// Returns error if any layer is unreadable or the result is invalid
    pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("CONFIG_ENV")
            .map(|value| value.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();

        let mut config = Self::for_environment(environment);
        if let Some(path) = path {
            let contents =
                std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            config = config.merge_toml(&contents)?;
        }

        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay TOML `contents` on this configuration
    ///
    /// Keys absent from `contents` keep their current values. The
    /// environment cannot be changed from a file.
    ///
    /// # Errors
    ///
    /// Returns error if `contents` is not valid TOML for this schema
    pub fn merge_toml(self, contents: &str) -> Result<Self, ConfigLoadError> {
        let environment = self.environment;
        let overlay: toml::Value = toml::from_str(contents)?;
        let mut merged = toml::Value::try_from(&self)?;
        merge_values(&mut merged, overlay);

        let mut config: Self = merged.try_into()?;
        config.environment = environment;
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: &F) -> Result<(), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = parse_var(lookup, "COPY_REFINERY_BACKEND")? {
            self.llm.backend = backend;
        }
        if let Some(model) = lookup("COPY_REFINERY_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(url) = lookup("COPY_REFINERY_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(max) = parse_var(lookup, "COPY_REFINERY_MAX_ITERATIONS")? {
            self.refinement.max_iterations = max;
        }
        if let Some(min) = parse_var(lookup, "COPY_REFINERY_MIN_IMPROVEMENT")? {
            self.refinement.min_improvement = min;
        }
        if let Some(max) = parse_var(lookup, "COPY_REFINERY_MAX_CONCURRENT")? {
            self.batch.max_concurrent = max;
        }
        if let Some(level) = lookup("COPY_REFINERY_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        Ok(())
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(backend) = overrides.backend {
            self.llm.backend = backend;
        }
        if let Some(model) = &overrides.model {
            self.llm.model = Some(model.clone());
        }
        if let Some(max) = overrides.max_iterations {
            self.refinement.max_iterations = max;
        }
        if let Some(min) = overrides.min_improvement {
            self.refinement.min_improvement = min;
        }
        if let Some(max) = overrides.max_concurrent {
            self.batch.max_concurrent = max;
        }
        if overrides.metrics {
            self.observability.metrics_enabled = true;
        }
    }

    /// Validate entire configuration
    ///
    /// # Errors
    ///
    /// Returns error if any configuration section is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate()?;
        self.scoring.validate()?;
        self.refinement.validate()?;
        self.batch.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigLoadError::InvalidOverride { var, value })
        })
        .transpose()
}

fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
