//! Store metrics
//!
//! Installs a process-wide recorder, so this file holds a single test.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use boxoffice_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use boxoffice_runtime::Store;
use boxoffice_testing::CountingRecorder;
use std::time::Duration;

#[derive(Debug, Clone)]
enum PingAction {
    Ping,
    Pong,
}

#[derive(Clone)]
struct PingReducer;

impl Reducer for PingReducer {
    type State = u32;
    type Action = PingAction;
    type Environment = ();

    fn reduce(
        &self,
        pongs: &mut u32,
        action: PingAction,
        _env: &(),
    ) -> SmallVec<[Effect<PingAction>; 4]> {
        match action {
            PingAction::Ping => smallvec![Effect::send(PingAction::Pong)],
            PingAction::Pong => {
                *pongs += 1;
                SmallVec::new()
            },
        }
    }
}

#[tokio::test]
async fn fed_back_actions_are_not_counted_as_commands() {
    let recorder = CountingRecorder::new();
    metrics::set_global_recorder(recorder.clone()).expect("recorder already installed");

    let store = Store::new(0, PingReducer, ());
    for _ in 0..3 {
        let mut handle = store.send(PingAction::Ping).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
    }
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.state(|pongs| *pongs).await, 3);
    assert_eq!(recorder.counter("store.commands.total"), 3);
    assert_eq!(recorder.counter("store.feedback.total"), 3);
}
