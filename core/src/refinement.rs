//! Iterative refinement state machine
//!
//! Improvement loop: take the best candidate → rewrite its weakest metric →
//! score the rewrite → keep it if it improved enough → repeat.
//!
//! ## Stopping rule
//!
//! 1. `improvement = new.overall_score - best.overall_score`
//! 2. `improvement < min_improvement`: stop with [`StopReason::Converged`].
//!    A rewrite that still beat the best is returned as the final candidate
//!    but is not added to the corpus; otherwise the prior best is kept.
//! 3. Otherwise accept: the rewrite becomes best and joins the corpus pool.
//!    Stop with [`StopReason::MetricsSaturated`] if every metric reached the
//!    saturation threshold, or with [`StopReason::MaxIterations`] once the
//!    accepted count reaches the budget.
//!
//! A generator failure or cancellation stops the loop with
//! `MaxIterations` and records an [`Interruption`]. The returned best score
//! never decreases.
//!
//! ## Example
//!
//! ```
//! use copy_refinery_core::refinement::{
//!     RefinementAction, RefinementConfig, RefinementEffect, RefinementReducer, RefinementState,
//! };
//! use copy_refinery_core::reducer::Reducer;
//! use copy_refinery_core::score::{MetricScores, ScoredText};
//! use copy_refinery_core::types::CorpusPool;
//!
//! let reducer = RefinementReducer::new(RefinementConfig::default(), 80.0).unwrap();
//! let initial = ScoredText::new("draft", 70.0, MetricScores::default());
//! let mut state = RefinementState::new(initial, CorpusPool::new());
//!
//! let effects = reducer.reduce(&mut state, RefinementAction::Begin, &());
//! assert!(matches!(effects[0], RefinementEffect::RequestRewrite(_)));
//! ```

use crate::error::ConfigError;
use crate::reducer::Reducer;
use crate::score::{Metric, MetricScores, ScoredText};
use crate::types::CorpusPool;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use tracing::{debug, info};

/// Loop bounds for a refinement run
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Maximum accepted rewrites
    pub max_iterations: u32,
    /// Minimum overall-score gain for a rewrite to be accepted
    pub min_improvement: f64,
}

impl RefinementConfig {
    /// Validate loop bounds
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroIterations` or
    /// `ConfigError::InvalidMinImprovement`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations < 1 {
            return Err(ConfigError::ZeroIterations);
        }
        if !self.min_improvement.is_finite() || self.min_improvement < 0.0 {
            return Err(ConfigError::InvalidMinImprovement(self.min_improvement));
        }
        Ok(())
    }
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            min_improvement: 0.5,
        }
    }
}

/// Why a refinement run stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    /// The last rewrite did not improve enough
    Converged,
    /// Iteration budget exhausted, or the run was cut short
    MaxIterations,
    /// Every metric reached the saturation threshold
    MetricsSaturated,
}

impl StopReason {
    /// Wire name (`CONVERGED`, `MAX_ITERATIONS`, `METRICS_SATURATED`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Converged => "CONVERGED",
            Self::MaxIterations => "MAX_ITERATIONS",
            Self::MetricsSaturated => "METRICS_SATURATED",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An early stop that was not a scoring decision
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interruption {
    /// The generator failed during a rewrite
    GenerationFailed {
        /// Failure description
        message: String,
    },
    /// The run was cancelled between iterations
    Cancelled,
}

/// What happened to one rewrite
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationOutcome {
    /// Improved by at least `min_improvement`; became best
    Accepted,
    /// Improved, but by less than `min_improvement`; returned as final
    KeptAsFinal,
    /// Did not improve; discarded
    Rejected,
}

/// Audit entry for one completed rewrite
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based rewrite number
    pub iteration: u32,
    /// Metric the rewrite targeted
    pub target: Metric,
    /// Overall score of the rewrite
    pub score: f64,
    /// Gain over the best at the time
    pub improvement: f64,
    /// What the controller did with it
    pub outcome: IterationOutcome,
}

/// A targeted rewrite the runtime should request from the generator
#[derive(Clone, Debug, PartialEq)]
pub struct RewriteRequest {
    /// Weakest metric to fix
    pub target: Metric,
    /// Current best text to rewrite
    pub draft: String,
    /// Breakdown of the current best
    pub scores: MetricScores,
}

/// Inputs to the refinement reducer
#[derive(Clone, Debug, PartialEq)]
pub enum RefinementAction {
    /// Start refining the initial candidate
    Begin,
    /// A requested rewrite was generated and scored
    CandidateScored {
        /// Metric the rewrite targeted
        target: Metric,
        /// The scored rewrite
        candidate: ScoredText,
    },
    /// The generator could not produce the requested rewrite
    GenerationFailed {
        /// Failure description
        message: String,
    },
    /// The caller abandoned the run
    Cancelled,
}

/// Effects emitted by the refinement reducer
#[derive(Clone, Debug, PartialEq)]
pub enum RefinementEffect {
    /// Generate and score a targeted rewrite
    RequestRewrite(RewriteRequest),
    /// The run is over
    Finish(StopReason),
}

/// Refinement state: the best candidate so far plus loop bookkeeping
#[derive(Clone, Debug)]
pub struct RefinementState {
    best: ScoredText,
    corpus: CorpusPool,
    accepted: u32,
    rounds: u32,
    stop: Option<StopReason>,
    interruption: Option<Interruption>,
    history: Vec<IterationRecord>,
}

impl RefinementState {
    /// Start from the selected candidate and the run's private corpus
    #[must_use]
    pub const fn new(initial: ScoredText, corpus: CorpusPool) -> Self {
        Self {
            best: initial,
            corpus,
            accepted: 0,
            rounds: 0,
            stop: None,
            interruption: None,
            history: Vec::new(),
        }
    }

    /// Best candidate seen so far
    #[must_use]
    pub const fn best(&self) -> &ScoredText {
        &self.best
    }

    /// Corpus pool including accepted rewrites
    #[must_use]
    pub const fn corpus(&self) -> &CorpusPool {
        &self.corpus
    }

    /// Number of accepted rewrites
    #[must_use]
    pub const fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Number of rewrites generated and scored
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Stop reason, once decided
    #[must_use]
    pub const fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// Whether the run has stopped
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.stop.is_some()
    }

    /// Early-stop cause, if any
    #[must_use]
    pub const fn interruption(&self) -> Option<&Interruption> {
        self.interruption.as_ref()
    }

    /// Per-rewrite audit trail
    #[must_use]
    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Convert into the run result
    ///
    /// A state that never reached a decision (the run was cut off) reports
    /// [`StopReason::MaxIterations`]; its best candidate is still valid.
    #[must_use]
    pub fn into_result(self) -> RefinementResult {
        RefinementResult {
            final_text: self.best.text.clone(),
            final_score: self.best,
            iterations_run: self.rounds,
            stop_reason: self.stop.unwrap_or(StopReason::MaxIterations),
            interruption: self.interruption,
            history: self.history,
        }
    }
}

/// Outcome of a refinement run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefinementResult {
    /// Text of the best candidate
    pub final_text: String,
    /// Scores of the best candidate
    pub final_score: ScoredText,
    /// Rewrites generated and scored
    pub iterations_run: u32,
    /// Why the loop stopped
    pub stop_reason: StopReason,
    /// Set when a generator failure or cancellation ended the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interruption: Option<Interruption>,
    /// Per-rewrite audit trail
    pub history: Vec<IterationRecord>,
}

/// Reducer implementing the refinement stopping rule
#[derive(Clone, Debug)]
pub struct RefinementReducer {
    config: RefinementConfig,
    saturation_threshold: f64,
}

impl RefinementReducer {
    /// Create a reducer from validated loop bounds
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` is invalid or the saturation
    /// threshold lies outside `[0, 100]`.
    pub fn new(config: RefinementConfig, saturation_threshold: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(0.0..=100.0).contains(&saturation_threshold) {
            return Err(ConfigError::InvalidSaturationThreshold(saturation_threshold));
        }
        Ok(Self {
            config,
            saturation_threshold,
        })
    }

    /// Loop bounds
    #[must_use]
    pub const fn config(&self) -> &RefinementConfig {
        &self.config
    }

    fn request_rewrite(state: &RefinementState) -> SmallVec<[RefinementEffect; 4]> {
        let target = state.best.weakest_metric();
        debug!(
            %target,
            best = state.best.overall_score,
            round = state.rounds + 1,
            "requesting targeted rewrite"
        );
        smallvec![RefinementEffect::RequestRewrite(RewriteRequest {
            target,
            draft: state.best.text.clone(),
            scores: state.best.metric_scores,
        })]
    }

    fn finish(state: &mut RefinementState, reason: StopReason) -> SmallVec<[RefinementEffect; 4]> {
        state.stop = Some(reason);
        info!(
            stop_reason = ?reason,
            rounds = state.rounds,
            accepted = state.accepted,
            final_score = state.best.overall_score,
            "refinement finished"
        );
        smallvec![RefinementEffect::Finish(reason)]
    }

    fn on_candidate(
        &self,
        state: &mut RefinementState,
        target: Metric,
        candidate: ScoredText,
    ) -> SmallVec<[RefinementEffect; 4]> {
        state.rounds += 1;
        let improvement = candidate.overall_score - state.best.overall_score;

        if improvement < self.config.min_improvement {
            let outcome = if improvement > 0.0 {
                IterationOutcome::KeptAsFinal
            } else {
                IterationOutcome::Rejected
            };
            state.history.push(IterationRecord {
                iteration: state.rounds,
                target,
                score: candidate.overall_score,
                improvement,
                outcome,
            });
            if outcome == IterationOutcome::KeptAsFinal {
                state.best = candidate;
            }
            return Self::finish(state, StopReason::Converged);
        }

        state.history.push(IterationRecord {
            iteration: state.rounds,
            target,
            score: candidate.overall_score,
            improvement,
            outcome: IterationOutcome::Accepted,
        });
        state.corpus.push(candidate.text.clone());
        state.best = candidate;
        state.accepted += 1;

        if state.best.is_saturated(self.saturation_threshold) {
            return Self::finish(state, StopReason::MetricsSaturated);
        }
        if state.accepted >= self.config.max_iterations {
            return Self::finish(state, StopReason::MaxIterations);
        }
        Self::request_rewrite(state)
    }
}

impl Reducer for RefinementReducer {
    type State = RefinementState;
    type Action = RefinementAction;
    type Environment = ();
    type Effect = RefinementEffect;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Self::Effect; 4]> {
        if state.is_finished() {
            return SmallVec::new();
        }

        match action {
            RefinementAction::Begin => Self::request_rewrite(state),

            RefinementAction::CandidateScored { target, candidate } => {
                self.on_candidate(state, target, candidate)
            }

            RefinementAction::GenerationFailed { message } => {
                tracing::warn!(%message, "rewrite generation failed, keeping best so far");
                state.interruption = Some(Interruption::GenerationFailed { message });
                Self::finish(state, StopReason::MaxIterations)
            }

            RefinementAction::Cancelled => {
                state.interruption = Some(Interruption::Cancelled);
                Self::finish(state, StopReason::MaxIterations)
            }
        }
    }
}
