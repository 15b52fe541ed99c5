//! Pipeline and batch runner end to end with deterministic doubles

#![allow(clippy::unwrap_used)] // Test code

use async_trait::async_trait;
use copy_refinery_core::{
    CandidateGenerator, CompositeScorer, CorpusPool, GenerationFailure, GenerationRequest,
    IterationOutcome, KeywordSet, ProductAttributes, RefinementConfig, RefinementReducer,
    ScoredText, StopReason, TextScorer, Variant,
};
use copy_refinery_runtime::{
    BatchConfig, BatchRunner, CancellationFlag, PipelineError, ProductJob, ProductPipeline,
    StaticKeywordSource,
};
use copy_refinery_testing::fixtures::{sample_corpus, wireless_mouse, wireless_mouse_keywords};
use copy_refinery_testing::mocks::uniform;
use copy_refinery_testing::{ScriptedGenerator, ScriptedScorer, init_test_tracing};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns "<product> draft <n>" with a per-product counter
#[derive(Default)]
struct NumberedDrafts {
    counters: Mutex<HashMap<String, u32>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    fail_for: Option<String>,
}

impl NumberedDrafts {
    fn failing_for(name: &str) -> Self {
        Self {
            fail_for: Some(name.to_string()),
            ..Self::default()
        }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateGenerator for NumberedDrafts {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        let name = request.product.name().to_string();
        if self.fail_for.as_deref() == Some(name.as_str()) {
            return Err(GenerationFailure::Unavailable("backend down".to_string()));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut counters = self.counters.lock().unwrap();
        let n = counters.entry(name.clone()).or_insert(0);
        *n += 1;
        Ok(format!("{name} draft {n}"))
    }
}

/// Scores "<product> draft <n>" as 50 + 5n and records the corpus it saw
#[derive(Default)]
struct DraftNumberScorer {
    seen: Mutex<Vec<(String, Vec<String>)>>,
}

impl TextScorer for DraftNumberScorer {
    fn score(&self, text: &str, _keywords: &KeywordSet, corpus: &CorpusPool) -> ScoredText {
        self.seen
            .lock()
            .unwrap()
            .push((text.to_string(), corpus.as_slice().to_vec()));
        let n: f64 = text
            .rsplit(' ')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0.0);
        let overall = 5.0f64.mul_add(n, 50.0);
        ScoredText::new(text, overall, uniform(overall))
    }
}

fn reducer() -> RefinementReducer {
    RefinementReducer::new(RefinementConfig::default(), 80.0).unwrap()
}

fn product(name: &str) -> ProductAttributes {
    ProductAttributes::new(
        name,
        vec!["compact".to_string(), "durable".to_string(), "quiet".to_string()],
        "home users",
    )
    .unwrap()
}

fn scripted_pipeline(generator: Arc<dyn CandidateGenerator>, scorer: Arc<dyn TextScorer>) -> ProductPipeline {
    ProductPipeline::new(generator, scorer, Arc::new(StaticKeywordSource::new()), reducer())
}

fn wireless_mouse_doubles() -> (Arc<ScriptedGenerator>, Arc<ScriptedScorer>) {
    let generator = Arc::new(ScriptedGenerator::new([
        "variant a", "variant b", "rewrite 1", "rewrite 2", "rewrite 3",
    ]));
    let scorer = Arc::new(
        ScriptedScorer::new()
            .with_text("variant a", 62.0)
            .with_text("variant b", 65.0)
            .with_text("rewrite 1", 68.0)
            .with_text("rewrite 2", 70.0)
            .with_text("rewrite 3", 72.0),
    );
    (generator, scorer)
}

#[tokio::test]
async fn test_wireless_mouse_end_to_end() {
    init_test_tracing();
    let (generator, scorer) = wireless_mouse_doubles();
    let pipeline = scripted_pipeline(generator.clone(), scorer);
    let job = ProductJob::new(wireless_mouse()).with_keywords(wireless_mouse_keywords());

    let report = pipeline
        .run(&job, sample_corpus(), &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(report.ab.selected, Variant::B);
    assert_eq!(report.final_text(), "rewrite 3");
    assert!((report.final_score() - 72.0).abs() < f64::EPSILON);
    assert_eq!(report.refinement.stop_reason, StopReason::MaxIterations);
    assert_eq!(report.refinement.iterations_run, 3);
    assert_eq!(report.keywords, wireless_mouse_keywords());

    let requests = generator.requests();
    assert!(!requests[0].is_rewrite());
    assert!(!requests[1].is_rewrite());
    assert_eq!(requests[2].draft.as_deref(), Some("variant b"));
}

#[tokio::test]
async fn test_same_doubles_give_same_report() {
    let job = ProductJob::new(wireless_mouse()).with_keywords(wireless_mouse_keywords());

    let mut reports = Vec::new();
    for _ in 0..2 {
        let (generator, scorer) = wireless_mouse_doubles();
        let pipeline = scripted_pipeline(generator, scorer);
        reports.push(
            pipeline
                .run(&job, sample_corpus(), &CancellationFlag::new())
                .await
                .unwrap(),
        );
    }

    assert_eq!(reports[0], reports[1]);
}

// Every sentence is six one-syllable words, so readability is identical
// across these texts and only structure and uniqueness move the score.
const FLAT_A: &str = "The mouse fits your hand well. It clicks soft and feels good.";
const PUNCTUATED_B: &str =
    "The mouse fits your hand well. It clicks soft and feels good. Soft, quick clicks, all day long.";
const TWO_PARAGRAPHS: &str =
    "The mouse fits your hand well. It clicks soft and feels good.\n\nSoft, quick clicks, all day long.";
const WITH_LIST: &str = "The mouse fits your hand well. It clicks soft and feels good.\n\nSoft, quick clicks, all day long.\n- Use it all day at work.";

fn canned_texts() -> Arc<ScriptedGenerator> {
    Arc::new(ScriptedGenerator::new([FLAT_A, PUNCTUATED_B, TWO_PARAGRAPHS, WITH_LIST]))
}

fn composite_pipeline(generator: Arc<ScriptedGenerator>) -> ProductPipeline {
    ProductPipeline::new(
        generator,
        Arc::new(CompositeScorer::default()),
        Arc::new(StaticKeywordSource::new()),
        reducer(),
    )
}

fn canned_job() -> ProductJob {
    ProductJob::new(wireless_mouse()).with_keywords(KeywordSet::new(["quiet mouse"]))
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn test_canned_texts_with_composite_scorer() {
    init_test_tracing();
    let generator = canned_texts();
    let pipeline = composite_pipeline(generator.clone());

    let report = pipeline
        .run(&canned_job(), CorpusPool::new(), &CancellationFlag::new())
        .await
        .unwrap();

    // A: no structure credit; B: punctuation credit
    assert!(approx(report.ab.variant_a.overall_score, 31.05));
    assert!(approx(report.ab.variant_b.overall_score, 37.05));
    assert_eq!(report.ab.selected, Variant::B);

    // The paragraph break is accepted and joins the pool. The list version
    // would gain structure but shares most of its words with the accepted
    // rewrite, so its uniqueness collapses and it is rejected.
    let refinement = &report.refinement;
    assert_eq!(refinement.stop_reason, StopReason::Converged);
    assert_eq!(refinement.iterations_run, 2);
    assert_eq!(report.final_text(), TWO_PARAGRAPHS);
    assert!(approx(report.final_score(), 43.05));

    let breakdown = &refinement.final_score.metric_scores;
    assert!(approx(breakdown.keyword, 0.0));
    assert!(approx(breakdown.readability, 57.75));
    assert!(approx(breakdown.length, 30.0));
    assert!(approx(breakdown.structure, 60.0));
    assert!(approx(breakdown.uniqueness, 100.0));

    assert_eq!(refinement.history.len(), 2);
    assert_eq!(refinement.history[0].outcome, IterationOutcome::Accepted);
    assert_eq!(refinement.history[1].outcome, IterationOutcome::Rejected);
    assert!(approx(refinement.history[1].score, 34.78));

    let requests = generator.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[2].draft.as_deref(), Some(PUNCTUATED_B));
    assert_eq!(requests[3].draft.as_deref(), Some(TWO_PARAGRAPHS));
}

#[test]
fn test_accepted_rewrite_lowers_later_uniqueness() {
    let scorer = CompositeScorer::default();
    let keywords = KeywordSet::new(["quiet mouse"]);

    let alone = scorer.score_description(WITH_LIST, &keywords, &CorpusPool::new());
    assert!(approx(alone.metric_scores.uniqueness, 100.0));
    assert!(approx(alone.metric_scores.structure, 80.0));
    assert!(approx(alone.overall_score, 47.05));

    // 18 shared words out of 22
    let pooled = CorpusPool::from(vec![TWO_PARAGRAPHS.to_string()]);
    let after = scorer.score_description(WITH_LIST, &keywords, &pooled);
    assert!(approx(after.metric_scores.uniqueness, 18.18));
    assert!(approx(after.overall_score, 34.78));
}

#[tokio::test]
async fn test_composite_scoring_reruns_identically() {
    let mut reports = Vec::new();
    for _ in 0..2 {
        let pipeline = composite_pipeline(canned_texts());
        reports.push(
            pipeline
                .run(&canned_job(), CorpusPool::new(), &CancellationFlag::new())
                .await
                .unwrap(),
        );
    }

    assert_eq!(reports[0], reports[1]);
}

#[tokio::test]
async fn test_ab_failure_yields_no_initial_candidate() {
    let generator = Arc::new(ScriptedGenerator::new(["variant a"]).then_fail(GenerationFailure::RateLimited));
    let pipeline = scripted_pipeline(generator, Arc::new(ScriptedScorer::new()));

    let result = pipeline
        .run(&ProductJob::new(wireless_mouse()), CorpusPool::new(), &CancellationFlag::new())
        .await;

    assert_eq!(
        result,
        Err(PipelineError::NoInitialCandidate(GenerationFailure::RateLimited))
    );
}

#[tokio::test]
async fn test_keywords_fall_back_to_features() {
    let generator = Arc::new(ScriptedGenerator::new(["a", "b"]));
    let pipeline = scripted_pipeline(generator.clone(), Arc::new(ScriptedScorer::new()));

    let report = pipeline
        .run(&ProductJob::new(wireless_mouse()), CorpusPool::new(), &CancellationFlag::new())
        .await
        .unwrap();

    let expected = KeywordSet::new(["ergonomic", "2.4GHz", "silent click"]);
    assert_eq!(report.keywords, expected);
    assert_eq!(generator.requests()[0].keywords, expected);
}

#[tokio::test]
async fn test_keyword_source_beats_fallback() {
    let generator = Arc::new(ScriptedGenerator::new(["a", "b"]));
    let source = StaticKeywordSource::new().with("wireless mouse", ["wireless mouse", "quiet mouse"]);
    let pipeline = ProductPipeline::new(
        generator,
        Arc::new(ScriptedScorer::new()),
        Arc::new(source),
        reducer(),
    );

    let report = pipeline
        .run(&ProductJob::new(wireless_mouse()), CorpusPool::new(), &CancellationFlag::new())
        .await
        .unwrap();

    assert_eq!(report.keywords, KeywordSet::new(["wireless mouse", "quiet mouse"]));
}

#[tokio::test]
async fn test_batch_keeps_input_order_and_concurrency_limit() {
    let generator = Arc::new(NumberedDrafts::default());
    let pipeline = scripted_pipeline(generator.clone(), Arc::new(DraftNumberScorer::default()));
    let runner = BatchRunner::new(Arc::new(pipeline), BatchConfig { max_concurrent: 2 }).unwrap();

    let names = ["Desk Lamp", "Keyboard", "Headphones", "Monitor", "Webcam"];
    let jobs = names.iter().map(|name| ProductJob::new(product(name))).collect();

    let outcomes = runner.run(jobs, &CorpusPool::new()).await;

    let order: Vec<&str> = outcomes.iter().map(|o| o.product.as_str()).collect();
    assert_eq!(order, names);
    for outcome in &outcomes {
        let report = outcome.result.as_ref().unwrap();
        assert_eq!(report.final_text(), format!("{} draft 5", outcome.product));
        assert_eq!(report.refinement.stop_reason, StopReason::MaxIterations);
    }
    assert!(generator.peak() <= 2);
}

#[tokio::test]
async fn test_batch_runs_never_share_accepted_rewrites() {
    let scorer = Arc::new(DraftNumberScorer::default());
    let pipeline = scripted_pipeline(Arc::new(NumberedDrafts::default()), scorer.clone());
    let runner = BatchRunner::new(Arc::new(pipeline), BatchConfig { max_concurrent: 3 }).unwrap();
    let corpus = sample_corpus();
    let baseline = corpus.as_slice().to_vec();

    let jobs = ["Kettle", "Toaster", "Blender"]
        .iter()
        .map(|name| ProductJob::new(product(name)))
        .collect();
    let outcomes = runner.run(jobs, &corpus).await;
    assert!(outcomes.iter().all(|o| o.result.is_ok()));

    for (text, seen) in scorer.seen.lock().unwrap().iter() {
        let owner = text.split(" draft ").next().unwrap();
        for entry in seen {
            assert!(
                baseline.contains(entry) || entry.starts_with(owner),
                "{text} was scored against {entry}"
            );
        }
    }
    assert_eq!(corpus.as_slice(), baseline.as_slice());
}

#[tokio::test]
async fn test_one_failed_product_does_not_sink_the_batch() {
    let pipeline = scripted_pipeline(
        Arc::new(NumberedDrafts::failing_for("Broken")),
        Arc::new(DraftNumberScorer::default()),
    );
    let runner = BatchRunner::new(Arc::new(pipeline), BatchConfig::default()).unwrap();

    let jobs = vec![ProductJob::new(product("Working")), ProductJob::new(product("Broken"))];
    let outcomes = runner.run(jobs, &CorpusPool::new()).await;

    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(PipelineError::NoInitialCandidate(GenerationFailure::Unavailable(_)))
    ));
}

#[tokio::test]
async fn test_cancelled_batch_starts_nothing() {
    let generator = Arc::new(NumberedDrafts::default());
    let pipeline = scripted_pipeline(generator.clone(), Arc::new(DraftNumberScorer::default()));
    let cancel = CancellationFlag::new();
    cancel.cancel();
    let runner = BatchRunner::new(Arc::new(pipeline), BatchConfig::default())
        .unwrap()
        .with_cancellation(cancel);

    let outcomes = runner
        .run(vec![ProductJob::new(product("Kettle"))], &CorpusPool::new())
        .await;

    assert_eq!(outcomes[0].result, Err(PipelineError::Cancelled));
    assert_eq!(generator.peak(), 0);
}
