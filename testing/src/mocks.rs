//! Scripted doubles for the generator and scorer seams
//!
//! Everything here is deterministic so refinement runs can be asserted step
//! by step without a real text backend.

use async_trait::async_trait;
use copy_refinery_core::{
    CandidateGenerator, CorpusPool, GenerationFailure, GenerationRequest, KeywordSet,
    MetricScores, ScoredText, TextScorer,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Generator that replays a fixed script of outcomes
///
/// Every request is recorded. Once the script runs out, further calls fail
/// with `GenerationFailure::Unavailable`.
///
/// # Example
///
/// ```
/// use copy_refinery_testing::mocks::ScriptedGenerator;
///
/// let generator = ScriptedGenerator::new(["first draft", "second draft"]);
/// assert_eq!(generator.remaining(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GenerationFailure>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    /// Script of successful outputs
    #[must_use]
    pub fn new<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_results(outputs.into_iter().map(|s| Ok(s.into())))
    }

    /// Script mixing outputs and failures
    #[must_use]
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, GenerationFailure>>,
    {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append a failure to the script
    #[must_use]
    pub fn then_fail(self, failure: GenerationFailure) -> Self {
        lock(&self.script).push_back(Err(failure));
        self
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    /// Number of calls received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Outcomes not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

#[async_trait]
impl CandidateGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        lock(&self.requests).push(request.clone());
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Err(GenerationFailure::Unavailable("script exhausted".to_string())))
    }
}

/// Generator that always fails the same way
#[derive(Debug)]
pub struct FailingGenerator {
    failure: GenerationFailure,
    calls: AtomicUsize,
}

impl FailingGenerator {
    /// Always return `failure`
    #[must_use]
    pub const fn new(failure: GenerationFailure) -> Self {
        Self {
            failure,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandidateGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.failure.clone())
    }
}

/// Scorer that hands out scores from a script instead of measuring text
///
/// Scores are looked up by exact text first, then taken from the sequence
/// in call order. Unscripted calls score 0.
#[derive(Debug, Default)]
pub struct ScriptedScorer {
    by_text: HashMap<String, ScoredParts>,
    sequence: Mutex<VecDeque<ScoredParts>>,
    corpus_sizes: Mutex<Vec<usize>>,
}

#[derive(Debug, Clone, Copy)]
struct ScoredParts {
    overall: f64,
    metrics: MetricScores,
}

impl ScriptedScorer {
    /// Scorer with no script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return these overall scores in call order
    #[must_use]
    pub fn with_sequence<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let scorer = Self::default();
        lock(&scorer.sequence).extend(scores.into_iter().map(|overall| ScoredParts {
            overall,
            metrics: uniform(overall),
        }));
        scorer
    }

    /// Fixed score for an exact text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>, overall: f64) -> Self {
        self.by_text.insert(
            text.into(),
            ScoredParts {
                overall,
                metrics: uniform(overall),
            },
        );
        self
    }

    /// Fixed score and breakdown for an exact text
    #[must_use]
    pub fn with_breakdown(mut self, text: impl Into<String>, overall: f64, metrics: MetricScores) -> Self {
        self.by_text.insert(text.into(), ScoredParts { overall, metrics });
        self
    }

    /// Corpus pool sizes seen on each call, in order
    #[must_use]
    pub fn corpus_sizes(&self) -> Vec<usize> {
        lock(&self.corpus_sizes).clone()
    }
}

impl TextScorer for ScriptedScorer {
    fn score(&self, text: &str, _keywords: &KeywordSet, corpus: &CorpusPool) -> ScoredText {
        lock(&self.corpus_sizes).push(corpus.len());
        let parts = self
            .by_text
            .get(text)
            .copied()
            .or_else(|| lock(&self.sequence).pop_front())
            .unwrap_or(ScoredParts {
                overall: 0.0,
                metrics: MetricScores::default(),
            });
        ScoredText::new(text, parts.overall, parts.metrics)
    }
}

/// Breakdown with every metric at `score`
#[must_use]
pub const fn uniform(score: f64) -> MetricScores {
    MetricScores {
        keyword: score,
        readability: score,
        length: score,
        structure: score,
        uniqueness: score,
    }
}
