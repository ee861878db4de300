//! # Box Office Testing
//!
//! Deterministic clocks ([`FixedClock`], [`SteppingClock`]), a Given/When/Then
//! harness for reducers ([`ReducerTest`]), ready-made effect checks
//! ([`assertions`]) and an in-memory metrics recorder ([`CountingRecorder`]).
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice_testing::{test_clock, ReducerTest, assertions};
//!
//! ReducerTest::new(BookingReducer::new())
//!     .with_env(environment_with(test_clock()))
//!     .given_state(BookingState::new(first_date))
//!     .when_action(BookingAction::ProceedToCheckout)
//!     .then_state(|state| assert!(state.last_rejection.is_some()))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

use boxoffice_core::environment::Clock;
use chrono::{DateTime, Duration, Utc};

mod recorder;
mod reducer_test;

pub use recorder::CountingRecorder;
pub use reducer_test::{ReducerTest, assertions};

/// Stand-ins for environment dependencies
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::Mutex;

    /// Clock frozen at one instant
    ///
    /// # Example
    ///
    /// ```
    /// use boxoffice_testing::mocks::FixedClock;
    /// use boxoffice_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Clock that always reads `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that moves forward by a fixed step every time it is read
    ///
    /// The first reading returns the start time.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SteppingClock {
        /// Create a clock starting at `start` and advancing by `step` per reading
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = match self.next.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let current = *next;
            *next = current + self.step;
            current
        }
    }

    /// Frozen at 2026-02-08 10:00:00 UTC, the first default screening day
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::from_timestamp_millis(1_770_544_800_000).unwrap_or(DateTime::UNIX_EPOCH),
        )
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs it.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

pub use mocks::{FixedClock, SteppingClock, test_clock};
