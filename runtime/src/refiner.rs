//! Refinement driver
//!
//! Executes the effects of [`RefinementReducer`]: each `RequestRewrite`
//! becomes one generator call plus one scoring pass, fed back as the next
//! action. The reducer decides; this module only performs I/O.

use crate::cancellation::CancellationFlag;
use crate::metrics::RunMetrics;
use copy_refinery_core::{
    CandidateGenerator, CorpusPool, GenerationRequest, KeywordSet, ProductAttributes, Reducer,
    RefinementAction, RefinementEffect, RefinementReducer, RefinementResult, RefinementState,
    RewriteRequest, ScoredText, TextScorer,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Drives one refinement run per call
#[derive(Clone)]
pub struct Refiner {
    generator: Arc<dyn CandidateGenerator>,
    scorer: Arc<dyn TextScorer>,
    reducer: RefinementReducer,
}

impl Refiner {
    /// Create a driver over the given seams
    #[must_use]
    pub fn new(
        generator: Arc<dyn CandidateGenerator>,
        scorer: Arc<dyn TextScorer>,
        reducer: RefinementReducer,
    ) -> Self {
        Self {
            generator,
            scorer,
            reducer,
        }
    }

    /// The reducer deciding each step
    #[must_use]
    pub const fn reducer(&self) -> &RefinementReducer {
        &self.reducer
    }

    /// Refine `initial` until the reducer stops
    ///
    /// `corpus` is this run's private pool; accepted rewrites are appended to
    /// it and never leak to other runs. Cancellation is checked before every
    /// rewrite. Generator failures end the run with the best so far.
    #[instrument(skip_all, fields(product = %product.name(), initial = initial.overall_score))]
    pub async fn refine(
        &self,
        product: &ProductAttributes,
        keywords: &KeywordSet,
        initial: ScoredText,
        corpus: CorpusPool,
        cancel: &CancellationFlag,
    ) -> RefinementResult {
        let mut state = RefinementState::new(initial, corpus);
        let mut next = Some(RefinementAction::Begin);

        while let Some(action) = next.take() {
            for effect in self.reducer.reduce(&mut state, action, &()) {
                match effect {
                    RefinementEffect::RequestRewrite(rewrite) => {
                        next = Some(if cancel.is_cancelled() {
                            info!(rounds = state.rounds(), "refinement cancelled");
                            RefinementAction::Cancelled
                        } else {
                            self.rewrite(product, keywords, &rewrite, state.corpus()).await
                        });
                    }
                    RefinementEffect::Finish(reason) => {
                        debug!(stop_reason = %reason, "refinement loop done");
                    }
                }
            }
        }

        let result = state.into_result();
        RunMetrics::record_run(
            result.stop_reason,
            result.iterations_run,
            result.final_score.overall_score,
        );
        result
    }

    async fn rewrite(
        &self,
        product: &ProductAttributes,
        keywords: &KeywordSet,
        rewrite: &RewriteRequest,
        corpus: &CorpusPool,
    ) -> RefinementAction {
        let request = GenerationRequest::rewrite(product.clone(), keywords.clone(), rewrite);

        match self.generator.generate(&request).await {
            Ok(text) => {
                let candidate = self.scorer.score(&text, keywords, corpus);
                debug!(
                    target_metric = %rewrite.target,
                    before = rewrite.scores.get(rewrite.target),
                    after = candidate.metric_scores.get(rewrite.target),
                    overall = candidate.overall_score,
                    "rewrite scored"
                );
                RefinementAction::CandidateScored {
                    target: rewrite.target,
                    candidate,
                }
            }
            Err(failure) => {
                RunMetrics::record_generation_failure();
                warn!(target_metric = %rewrite.target, error = %failure, "rewrite generation failed");
                RefinementAction::GenerationFailed {
                    message: failure.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for Refiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refiner")
            .field("reducer", &self.reducer)
            .finish_non_exhaustive()
    }
}
