//! Integration tests for the Store runtime
//!
//! Exercises the feedback loop: effect-produced actions are broadcast to
//! subscribers and then reduced, delayed actions fire after their duration,
//! and a shut down store rejects new work.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use boxoffice_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use boxoffice_runtime::{Store, StoreError};
use boxoffice_testing::init_test_tracing;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum HoldAction {
    /// Hold a seat and announce it
    Hold { seat: u16 },
    /// Announcement produced by an effect
    Held { seat: u16 },
    /// Hold a seat and release it after a delay
    HoldBriefly { seat: u16, millis: u64 },
    /// Delayed release
    Release { seat: u16 },
    /// Two announcements, one after another
    HoldPair { first: u16, second: u16 },
}

#[derive(Debug, Clone, Default)]
struct HoldState {
    held: Vec<u16>,
    announced: Vec<u16>,
}

#[derive(Clone)]
struct HoldReducer;

impl Reducer for HoldReducer {
    type State = HoldState;
    type Action = HoldAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            HoldAction::Hold { seat } => {
                state.held.push(seat);
                smallvec![Effect::send(HoldAction::Held { seat })]
            },
            HoldAction::Held { seat } => {
                state.announced.push(seat);
                smallvec![Effect::None]
            },
            HoldAction::HoldBriefly { seat, millis } => {
                state.held.push(seat);
                smallvec![Effect::Delay {
                    duration: Duration::from_millis(millis),
                    action: Box::new(HoldAction::Release { seat }),
                }]
            },
            HoldAction::Release { seat } => {
                state.held.retain(|held| *held != seat);
                smallvec![Effect::None]
            },
            HoldAction::HoldPair { first, second } => {
                state.held.extend([first, second]);
                smallvec![Effect::chain(vec![
                    Effect::send(HoldAction::Held { seat: first }),
                    Effect::send(HoldAction::Held { seat: second }),
                ])]
            },
        }
    }
}

fn store() -> Store<HoldState, HoldAction, (), HoldReducer> {
    init_test_tracing();
    Store::new(HoldState::default(), HoldReducer, ())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn effect_actions_are_fed_back() {
    let store = store();

    let mut handle = store.send(HoldAction::Hold { seat: 12 }).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    let (held, announced) = store.state(|s| (s.held.clone(), s.announced.clone())).await;
    assert_eq!(held, vec![12]);
    assert_eq!(announced, vec![12]);
}

#[tokio::test]
async fn effect_actions_are_broadcast() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(HoldAction::Hold { seat: 45 }).await.unwrap();

    let observed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(observed, HoldAction::Held { seat: 45 });
}

#[tokio::test]
async fn send_and_wait_for_returns_matching_action() {
    let store = store();

    let result = store
        .send_and_wait_for(
            HoldAction::Hold { seat: 46 },
            |action| matches!(action, HoldAction::Held { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(result, HoldAction::Held { seat: 46 });
}

#[tokio::test]
async fn send_and_wait_for_times_out_without_match() {
    let store = store();

    let result = store
        .send_and_wait_for(
            HoldAction::Release { seat: 1 },
            |_| true,
            Duration::from_millis(20),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test(start_paused = true)]
async fn delayed_action_fires_after_duration() {
    let store = store();

    store
        .send(HoldAction::HoldBriefly { seat: 100, millis: 5_000 })
        .await
        .unwrap();
    assert_eq!(store.state(|s| s.held.clone()).await, vec![100]);

    tokio::time::sleep(Duration::from_millis(4_000)).await;
    assert_eq!(store.state(|s| s.held.clone()).await, vec![100]);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(store.state(|s| s.held.is_empty()).await);
}

#[tokio::test]
async fn sequential_effects_run_in_order() {
    let store = store();

    let mut handle = store
        .send(HoldAction::HoldPair { first: 3, second: 4 })
        .await
        .unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    // Feedback of the last step may still be applying
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(store.state(|s| s.announced.clone()).await, vec![3, 4]);
}

#[tokio::test]
async fn shutdown_rejects_new_actions() {
    let store = store();

    store.shutdown(Duration::from_secs(1)).await.unwrap();
    let result = store.send(HoldAction::Hold { seat: 1 }).await;

    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    assert!(store.state(|s| s.held.is_empty()).await);
}

#[tokio::test]
async fn clones_share_state() {
    let first = store();
    let second = first.clone();

    first.send(HoldAction::Release { seat: 9 }).await.unwrap();
    second
        .send(HoldAction::HoldBriefly { seat: 9, millis: 60_000 })
        .await
        .unwrap();

    assert_eq!(first.state(|s| s.held.clone()).await, vec![9]);
}
