//! The Reducer trait - pure state transitions that describe their effects
//!
//! Reducers are pure functions `(State, Action, Environment) → (State, Effects)`.
//! They hold all decision logic; a runtime executes the returned effect
//! descriptions and feeds outcomes back in as new actions.

use smallvec::SmallVec;

/// Core abstraction for deterministic state machines
///
/// # Type Parameters
///
/// - `State`: The state this reducer operates on
/// - `Action`: The inputs it processes
/// - `Environment`: Injected read-only dependencies
/// - `Effect`: Descriptions of work for the runtime to carry out
///
/// # Example
///
/// ```ignore
/// impl Reducer for RefinementReducer {
///     type State = RefinementState;
///     type Action = RefinementAction;
///     type Environment = ();
///     type Effect = RefinementEffect;
///
///     fn reduce(&self, state: &mut RefinementState, action: RefinementAction, _env: &())
///         -> SmallVec<[RefinementEffect; 4]>
///     {
///         // decide, mutate state, describe what happens next
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// The effect descriptions this reducer emits
    type Effect;

    /// Reduce an action into state changes and effects
    ///
    /// # Arguments
    ///
    /// - `state`: Mutable reference to current state
    /// - `action`: The action to process
    /// - `env`: Reference to injected dependencies
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Self::Effect; 4]>;
}
