//! Given/When/Then harness for reducers
//!
//! Reducers are pure, so a test is a starting state, a list of actions and
//! checks on what comes out. No runtime is involved.

#![allow(clippy::module_name_repetitions)]

use boxoffice_core::{SmallVec, effect::Effect, reducer::Reducer};

type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Builds and runs one reducer scenario
///
/// Actions passed to `when_action` are reduced in order against the same
/// state. State checks see the final state; effect checks see only what the
/// last action returned.
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(BookingReducer::new())
///     .with_env(env)
///     .given_state(BookingState::new(first_date))
///     .when_action(BookingAction::OpenShowing { showing_id })
///     .when_action(BookingAction::ToggleSeat { seat: 12 })
///     .then_state(|state| assert_eq!(state.selected_seats.len(), 1))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    env: Option<E>,
    given: Option<S>,
    when: Vec<A>,
    state_checks: Vec<StateCheck<S>>,
    effect_checks: Vec<EffectCheck<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Starts a scenario for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            given: None,
            when: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Environment passed to every `reduce` call
    #[must_use]
    pub fn with_env(self, env: E) -> Self {
        Self {
            env: Some(env),
            ..self
        }
    }

    /// Given: the state before the first action
    #[must_use]
    pub fn given_state(self, state: S) -> Self {
        Self {
            given: Some(state),
            ..self
        }
    }

    /// When: one more action to reduce
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.when.push(action);
        self
    }

    /// Then: a check on the final state
    #[must_use]
    pub fn then_state(mut self, check: impl FnOnce(&S) + 'static) -> Self {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Then: a check on the effects of the last action
    #[must_use]
    pub fn then_effects(mut self, check: impl FnOnce(&[Effect<A>]) + 'static) -> Self {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Reduces every action and runs the checks
    ///
    /// # Panics
    ///
    /// Panics when the state, the environment or every action is missing, and
    /// whenever a check fails.
    #[allow(clippy::expect_used)]
    pub fn run(self) {
        let Self {
            reducer,
            env,
            given,
            when,
            state_checks,
            effect_checks,
        } = self;

        let env = env.expect("call with_env() before run()");
        let mut state = given.expect("call given_state() before run()");
        assert!(!when.is_empty(), "call when_action() before run()");

        let last: SmallVec<[Effect<A>; 4]> = when
            .into_iter()
            .fold(SmallVec::new(), |_, action| reducer.reduce(&mut state, action, &env));

        state_checks.into_iter().for_each(|check| check(&state));
        effect_checks.into_iter().for_each(|check| check(&last));
    }
}

/// Ready-made effect checks
pub mod assertions {
    use boxoffice_core::effect::Effect;
    use std::fmt::Debug;

    /// Every effect is a no-op
    ///
    /// # Panics
    ///
    /// Panics if any effect would do work.
    pub fn assert_no_effects<A: Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "expected only no-op effects, got {effects:?}"
        );
    }

    /// Exactly `expected` top-level effects
    ///
    /// # Panics
    ///
    /// Panics on any other count.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected number of effects");
    }

    /// Some effect, possibly nested, is a `Future`
    ///
    /// # Panics
    ///
    /// Panics if none is.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| find(e, &|e| matches!(e, Effect::Future(_)))),
            "expected a future effect"
        );
    }

    /// Some effect, possibly nested, is a `Delay`
    ///
    /// # Panics
    ///
    /// Panics if none is.
    pub fn assert_has_delay_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| find(e, &|e| matches!(e, Effect::Delay { .. }))),
            "expected a delay effect"
        );
    }

    fn find<A>(effect: &Effect<A>, hit: &dyn Fn(&Effect<A>) -> bool) -> bool {
        match effect {
            Effect::Parallel(inner) | Effect::Sequential(inner) => {
                inner.iter().any(|e| find(e, hit))
            },
            other => hit(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_core::smallvec;
    use std::time::Duration;

    #[derive(Clone, Debug)]
    struct SeatsState {
        held: u32,
    }

    #[derive(Clone, Debug)]
    enum SeatsAction {
        Hold,
        Release,
        Expire,
    }

    struct SeatsReducer;

    struct SeatsEnv;

    impl Reducer for SeatsReducer {
        type State = SeatsState;
        type Action = SeatsAction;
        type Environment = SeatsEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                SeatsAction::Hold => {
                    state.held += 1;
                    smallvec![Effect::None]
                },
                SeatsAction::Release => {
                    state.held = state.held.saturating_sub(1);
                    smallvec![Effect::merge(vec![
                        Effect::send(SeatsAction::Hold),
                        Effect::Delay {
                            duration: Duration::from_secs(5),
                            action: Box::new(SeatsAction::Expire),
                        },
                    ])]
                },
                SeatsAction::Expire => SmallVec::new(),
            }
        }
    }

    #[test]
    fn actions_apply_in_order() {
        ReducerTest::new(SeatsReducer)
            .with_env(SeatsEnv)
            .given_state(SeatsState { held: 0 })
            .when_action(SeatsAction::Hold)
            .when_action(SeatsAction::Hold)
            .then_state(|state| {
                assert_eq!(state.held, 2);
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn nested_effects_are_found() {
        ReducerTest::new(SeatsReducer)
            .with_env(SeatsEnv)
            .given_state(SeatsState { held: 1 })
            .when_action(SeatsAction::Release)
            .then_state(|state| {
                assert_eq!(state.held, 0);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
                assertions::assert_has_delay_effect(effects);
            })
            .run();
    }

    #[test]
    fn empty_and_noop_effects_pass() {
        assertions::assert_no_effects::<SeatsAction>(&[Effect::None]);
        assertions::assert_no_effects::<SeatsAction>(&[]);
    }
}
