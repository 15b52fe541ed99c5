//! Concurrent batch runner
//!
//! Runs many products on tokio tasks behind a semaphore. Every product gets
//! its own clone of the corpus snapshot taken when the batch starts, so no
//! run ever sees another run's accepted rewrites.

use crate::cancellation::CancellationFlag;
use crate::error::PipelineError;
use crate::pipeline::{ProductJob, ProductPipeline, ProductReport};
use copy_refinery_core::{ConfigError, CorpusPool};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Batch configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum products refined at once
    pub max_concurrent: usize,
}

impl BatchConfig {
    /// Validate batch configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `max_concurrent` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid("max_concurrent must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

/// Result for one product of a batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Product name
    pub product: String,
    /// Report, or why there is none
    pub result: Result<ProductReport, PipelineError>,
}

/// Runs product jobs concurrently
#[derive(Debug, Clone)]
pub struct BatchRunner {
    pipeline: Arc<ProductPipeline>,
    semaphore: Arc<Semaphore>,
    config: BatchConfig,
    cancel: CancellationFlag,
}

impl BatchRunner {
    /// Create a runner
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` is invalid
    pub fn new(pipeline: Arc<ProductPipeline>, config: BatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pipeline,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            config,
            cancel: CancellationFlag::new(),
        })
    }

    /// Builder: share an existing cancellation flag
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that stops every run in this batch between iterations
    #[must_use]
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Batch configuration
    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run every job; outcomes come back in input order
    pub async fn run(&self, jobs: Vec<ProductJob>, corpus: &CorpusPool) -> Vec<BatchOutcome> {
        let total = jobs.len();
        let snapshot = corpus.clone();
        let names: Vec<String> = jobs.iter().map(|job| job.product.name().to_string()).collect();
        info!(
            products = total,
            max_concurrent = self.config.max_concurrent,
            corpus = snapshot.len(),
            "batch started"
        );

        let mut tasks = JoinSet::new();
        for (index, job) in jobs.into_iter().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            let semaphore = Arc::clone(&self.semaphore);
            let cancel = self.cancel.clone();
            let corpus = snapshot.clone();

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => pipeline.run(&job, corpus, &cancel).await,
                    Err(_) => Err(PipelineError::Cancelled),
                };
                (index, result)
            });
        }

        let mut results: Vec<Option<Result<ProductReport, PipelineError>>> =
            (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!(error = %e, "batch task aborted"),
            }
        }

        let outcomes: Vec<BatchOutcome> = names
            .into_iter()
            .zip(results)
            .map(|(product, result)| BatchOutcome {
                product,
                result: result
                    .unwrap_or_else(|| Err(PipelineError::TaskFailed("task aborted".to_string()))),
            })
            .collect();

        let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        info!(succeeded, failed = total - succeeded, "batch finished");
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_validation() {
        assert!(BatchConfig::default().validate().is_ok());
        assert!(BatchConfig { max_concurrent: 0 }.validate().is_err());
    }
}
