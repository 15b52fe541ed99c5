//! A/B selection of the initial candidate

use crate::metrics::RunMetrics;
use copy_refinery_core::{
    AbSelection, CandidateGenerator, CorpusPool, GenerationFailure, GenerationRequest, TextScorer,
};
use tracing::{info, instrument, warn};

/// Generate two candidates for `request`, score both, keep the better one
///
/// The calls run sequentially, A then B. Both candidates are scored against
/// the same corpus snapshot. An exact score tie selects A.
///
/// # Errors
///
/// Returns the `GenerationFailure` of whichever call failed first: without
/// both candidates there is no selection.
#[instrument(skip_all, fields(product = %request.product.name()))]
pub async fn select_candidate(
    generator: &dyn CandidateGenerator,
    scorer: &dyn TextScorer,
    request: &GenerationRequest,
    corpus: &CorpusPool,
) -> Result<AbSelection, GenerationFailure> {
    let text_a = generate(generator, request, "A").await?;
    let text_b = generate(generator, request, "B").await?;

    let variant_a = scorer.score(&text_a, &request.keywords, corpus);
    let variant_b = scorer.score(&text_b, &request.keywords, corpus);

    let selection = AbSelection::decide(variant_a, variant_b);
    RunMetrics::record_selection(selection.selected);
    info!(
        score_a = selection.variant_a.overall_score,
        score_b = selection.variant_b.overall_score,
        selected = %selection.selected,
        "A/B candidate selected"
    );
    Ok(selection)
}

async fn generate(
    generator: &dyn CandidateGenerator,
    request: &GenerationRequest,
    variant: &'static str,
) -> Result<String, GenerationFailure> {
    generator.generate(request).await.inspect_err(|failure| {
        RunMetrics::record_generation_failure();
        warn!(variant, error = %failure, "initial candidate generation failed");
    })
}
