//! # Box Office Core
//!
//! The abstractions every box office feature is written against.
//!
//! A feature is a pure state machine:
//!
//! - **State**: the owned data of one session (selected date, seats, tickets)
//! - **Action**: every input the state machine accepts, commands and events alike
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`, synchronous
//! - **Effect**: a description of work for the runtime, never the work itself
//! - **Environment**: injected dependencies such as the [`environment::Clock`]
//!
//! The reducer never performs I/O and never awaits. Anything that has to happen
//! later (a notice that disappears after a few seconds, a message for the
//! display) is returned as an [`effect::Effect`] and executed by the store in
//! the runtime crate.
//!
//! ## Example
//!
//! ```
//! use boxoffice_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct TallyState {
//!     seats: u32,
//! }
//!
//! enum TallyAction {
//!     Add,
//! }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = TallyState;
//!     type Action = TallyAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TallyState,
//!         action: TallyAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TallyAction>; 4]> {
//!         match action {
//!             TallyAction::Add => state.seats += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = TallyState::default();
//! let effects = TallyReducer.reduce(&mut state, TallyAction::Add, &());
//! assert_eq!(state.seats, 1);
//! assert_eq!(effects.len(), 1);
//! ```

pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Where the decisions are made
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// A synchronous state machine over `State`, driven by `Action`s
    ///
    /// Effects come back in a [`SmallVec`] with room for four inline; a
    /// session action rarely yields more than two.
    pub trait Reducer {
        /// Owned data the reducer mutates
        type State;

        /// Inputs, both commands and the events they produce
        type Action;

        /// Dependencies handed in from outside (clock, catalog, settings)
        type Environment;

        /// Applies `action` to `state` and describes the follow-up work
        ///
        /// Must not block or perform I/O.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Follow-up work returned by reducers
///
/// Effects are values; the store decides when and where they run.
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Work for the runtime; `Action` is what the work may feed back
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Children started together
        Parallel(Vec<Effect<Action>>),

        /// Children started one after another, each awaited
        Sequential(Vec<Effect<Action>>),

        /// Feed `action` back once `duration` has passed
        Delay {
            /// Wait before dispatch
            duration: Duration,
            /// Dispatched afterwards
            action: Box<Action>,
        },

        /// Async work; a `Some` result is broadcast, then reduced
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action: fmt::Debug> fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => f.write_str("Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => f.write_str("Effect::Future(<future>)"),
            }
        }
    }

    impl<Action: Send + 'static> Effect<Action> {
        /// Feed `action` back into the store as soon as effects run
        ///
        /// The action is broadcast to subscribers before it reaches the
        /// reducer, which is how the display learns about notices.
        #[must_use]
        pub fn send(action: Action) -> Self {
            Effect::Future(Box::pin(std::future::ready(Some(action))))
        }
    }

    impl<Action> Effect<Action> {
        /// Starts `effects` together
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Runs `effects` in order
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing at all
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                Effect::Delay { .. } | Effect::Future(_) => false,
            }
        }
    }
}

/// Injected dependencies
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of the current instant
    ///
    /// Ticket numbers are derived from the clock, so tests inject a fixed one.
    pub trait Clock: Send + Sync {
        /// Current instant in UTC
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock used outside of tests
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
