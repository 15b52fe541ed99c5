//! Refinement reducer scenarios written with `ReducerTest`

use copy_refinery_core::{
    CorpusPool, Interruption, IterationOutcome, Metric, RefinementAction, RefinementConfig,
    RefinementEffect, RefinementReducer, RefinementState, ScoredText, StopReason,
};
use copy_refinery_testing::fixtures::{FLAT_DESCRIPTION, sample_corpus};
use copy_refinery_testing::mocks::uniform;
use copy_refinery_testing::{ReducerTest, assertions};

fn reducer(max_iterations: u32) -> RefinementReducer {
    let config = RefinementConfig {
        max_iterations,
        min_improvement: 0.5,
    };
    RefinementReducer::new(config, 80.0).unwrap_or_else(|e| unreachable!("valid config: {e}"))
}

fn start(overall: f64) -> RefinementState {
    RefinementState::new(
        ScoredText::new(FLAT_DESCRIPTION, overall, uniform(overall)),
        sample_corpus(),
    )
}

fn scored(text: &str, overall: f64) -> RefinementAction {
    RefinementAction::CandidateScored {
        target: Metric::Structure,
        candidate: ScoredText::new(text, overall, uniform(overall)),
    }
}

#[test]
fn accepted_rewrite_joins_the_pool_and_asks_for_another() {
    let pool_size = sample_corpus().len();
    ReducerTest::new(reducer(3))
        .with_env(())
        .given_state(start(60.0))
        .when_action(RefinementAction::Begin)
        .when_action(scored("better", 64.0))
        .then_state(move |state| {
            assert_eq!(state.best().text, "better");
            assert_eq!(state.accepted(), 1);
            assert_eq!(state.corpus().len(), pool_size + 1);
        })
        .then_effects(assertions::assert_requests_rewrite)
        .run();
}

#[test]
fn budget_of_one_stops_after_first_acceptance() {
    ReducerTest::new(reducer(1))
        .with_env(())
        .given_state(start(60.0))
        .when_action(RefinementAction::Begin)
        .when_action(scored("better", 64.0))
        .then_effects(|effects| assertions::assert_finished_with(effects, StopReason::MaxIterations))
        .run();
}

#[test]
fn saturated_candidate_wins_over_remaining_budget() {
    ReducerTest::new(reducer(3))
        .with_env(())
        .given_state(start(60.0))
        .when_action(RefinementAction::Begin)
        .when_action(scored("excellent", 90.0))
        .then_state(|state| assert_eq!(state.stop_reason(), Some(StopReason::MetricsSaturated)))
        .then_effects(|effects| {
            assertions::assert_finished_with(effects, StopReason::MetricsSaturated);
        })
        .run();
}

#[test]
fn marginal_gain_is_kept_but_not_pooled() {
    let pool_size = sample_corpus().len();
    ReducerTest::new(reducer(3))
        .with_env(())
        .given_state(start(70.0))
        .when_action(RefinementAction::Begin)
        .when_action(scored("slightly better", 70.3))
        .then_state(move |state| {
            assert_eq!(state.best().text, "slightly better");
            assert_eq!(state.accepted(), 0);
            assert_eq!(state.corpus().len(), pool_size);
            assert_eq!(state.history()[0].outcome, IterationOutcome::KeptAsFinal);
        })
        .then_effects(|effects| assertions::assert_finished_with(effects, StopReason::Converged))
        .run();
}

#[test]
fn generation_failure_ends_softly() {
    ReducerTest::new(reducer(3))
        .with_env(())
        .given_state(start(60.0))
        .when_action(RefinementAction::Begin)
        .when_action(scored("better", 65.0))
        .when_action(RefinementAction::GenerationFailed {
            message: "rate limited".to_string(),
        })
        .then_state(|state| {
            assert_eq!(state.best().text, "better");
            assert!(matches!(
                state.interruption(),
                Some(Interruption::GenerationFailed { message }) if message == "rate limited"
            ));
        })
        .then_effects(|effects| {
            assert!(matches!(
                effects,
                [RefinementEffect::Finish(StopReason::MaxIterations)]
            ));
        })
        .run();
}

#[test]
fn cancellation_before_first_rewrite_keeps_initial() {
    ReducerTest::new(reducer(3))
        .with_env(())
        .given_state(start(60.0))
        .when_action(RefinementAction::Begin)
        .when_action(RefinementAction::Cancelled)
        .then_state(|state| {
            assert_eq!(state.best().text, FLAT_DESCRIPTION);
            assert_eq!(state.rounds(), 0);
            assert_eq!(state.interruption(), Some(&Interruption::Cancelled));
        })
        .then_effects(|effects| assertions::assert_finished_with(effects, StopReason::MaxIterations))
        .run();
}
