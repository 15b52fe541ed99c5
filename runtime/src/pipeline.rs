//! Per-product pipeline: keywords, A/B selection, refinement

use crate::cancellation::CancellationFlag;
use crate::error::PipelineError;
use crate::keywords::{KeywordSource, feature_fallback};
use crate::metrics::PipelineMetrics;
use crate::refiner::Refiner;
use crate::selector::select_candidate;
use copy_refinery_core::{
    AbSelection, CandidateGenerator, CorpusPool, GenerationRequest, KeywordSet, ProductAttributes,
    RefinementReducer, RefinementResult, TextScorer,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// One product to describe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductJob {
    /// Product attributes
    pub product: ProductAttributes,
    /// Explicit keywords; looked up from the keyword source when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordSet>,
}

impl ProductJob {
    /// Job that resolves keywords from the source
    #[must_use]
    pub const fn new(product: ProductAttributes) -> Self {
        Self {
            product,
            keywords: None,
        }
    }

    /// Builder: use these keywords
    #[must_use]
    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = Some(keywords);
        self
    }
}

/// Everything produced for one product
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    /// Product attributes
    pub product: ProductAttributes,
    /// Keywords actually used
    pub keywords: KeywordSet,
    /// A/B audit record
    pub ab: AbSelection,
    /// Refinement outcome
    pub refinement: RefinementResult,
}

impl ProductReport {
    /// Final description text
    #[must_use]
    pub fn final_text(&self) -> &str {
        &self.refinement.final_text
    }

    /// Final overall score
    #[must_use]
    pub const fn final_score(&self) -> f64 {
        self.refinement.final_score.overall_score
    }
}

/// Runs products end to end through the generator and scorer seams
#[derive(Clone)]
pub struct ProductPipeline {
    generator: Arc<dyn CandidateGenerator>,
    scorer: Arc<dyn TextScorer>,
    keyword_source: Arc<dyn KeywordSource>,
    refiner: Refiner,
}

impl ProductPipeline {
    /// Assemble a pipeline
    #[must_use]
    pub fn new(
        generator: Arc<dyn CandidateGenerator>,
        scorer: Arc<dyn TextScorer>,
        keyword_source: Arc<dyn KeywordSource>,
        reducer: RefinementReducer,
    ) -> Self {
        let refiner = Refiner::new(Arc::clone(&generator), Arc::clone(&scorer), reducer);
        Self {
            generator,
            scorer,
            keyword_source,
            refiner,
        }
    }

    /// Keywords for `job`: explicit, then the keyword source, then features
    pub async fn resolve_keywords(&self, job: &ProductJob) -> KeywordSet {
        if let Some(keywords) = job.keywords.as_ref().filter(|k| !k.is_empty()) {
            return keywords.clone();
        }

        let found = self.keyword_source.keywords_for(&job.product).await;
        if !found.is_empty() {
            return found;
        }

        let fallback = feature_fallback(&job.product);
        if !fallback.is_empty() {
            debug!(keywords = ?fallback.as_slice(), "no keywords found, using product features");
        }
        fallback
    }

    /// Run one product
    ///
    /// `corpus` is this product's private snapshot.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Cancelled` if cancellation was requested before
    /// the product started, and `PipelineError::NoInitialCandidate` if the
    /// A/B step could not produce both candidates.
    #[instrument(skip_all, fields(product = %job.product.name()))]
    pub async fn run(
        &self,
        job: &ProductJob,
        corpus: CorpusPool,
        cancel: &CancellationFlag,
    ) -> Result<ProductReport, PipelineError> {
        if cancel.is_cancelled() {
            PipelineMetrics::record_error("cancelled");
            return Err(PipelineError::Cancelled);
        }
        let started = Instant::now();

        let keywords = self.resolve_keywords(job).await;
        let request = GenerationRequest::initial(job.product.clone(), keywords.clone());

        let ab = select_candidate(self.generator.as_ref(), self.scorer.as_ref(), &request, &corpus)
            .await
            .map_err(|failure| {
                PipelineMetrics::record_error("no_initial_candidate");
                PipelineError::NoInitialCandidate(failure)
            })?;

        let refinement = self
            .refiner
            .refine(&job.product, &keywords, ab.winner().clone(), corpus, cancel)
            .await;

        PipelineMetrics::record_product(started.elapsed());
        info!(
            final_score = refinement.final_score.overall_score,
            iterations = refinement.iterations_run,
            stop_reason = %refinement.stop_reason,
            "product report ready"
        );

        Ok(ProductReport {
            product: job.product.clone(),
            keywords,
            ab,
            refinement,
        })
    }
}

impl std::fmt::Debug for ProductPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductPipeline")
            .field("refiner", &self.refiner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_product_job_from_json() {
        let job: ProductJob = serde_json::from_str(
            r#"{
                "product": {
                    "name": "Wireless Mouse",
                    "features": ["ergonomic", "2.4GHz"],
                    "target_audience": "office workers"
                },
                "keywords": ["wireless mouse"]
            }"#,
        )
        .unwrap();
        assert_eq!(job.product.name(), "Wireless Mouse");
        assert_eq!(job.keywords, Some(KeywordSet::new(["wireless mouse"])));

        let job: ProductJob =
            serde_json::from_str(r#"{"product": {"name": "Desk Lamp"}}"#).unwrap();
        assert_eq!(job.keywords, None);
    }
}
