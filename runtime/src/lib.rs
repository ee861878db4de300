//! # Box Office Runtime
//!
//! The [`Store`] owns one session's state and is the only way to change it.
//!
//! - **Store**: holds state behind an async `RwLock`, runs the reducer, executes effects
//! - **Effect execution**: `Future` and `Delay` effects run on the tokio runtime and
//!   feed the action they produce back into the reducer
//! - **Action broadcast**: every effect-produced action is published to subscribers,
//!   which is how a display learns about notices without polling
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice_runtime::Store;
//!
//! let store = Store::new(BookingState::new(first_date), BookingReducer::new(), env);
//!
//! let mut handle = store.send(BookingAction::OpenShowing { showing_id }).await?;
//! handle.wait().await;
//!
//! let seats = store.state(|s| s.selected_seats.len()).await;
//! ```

use boxoffice_core::{effect::Effect, reducer::Reducer};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{RwLock, watch};

/// Store failures
pub mod error {
    use thiserror::Error;

    /// Why the store could not do what was asked
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// [`Store::shutdown`](crate::Store::shutdown) was called; no new actions
        #[error("store is shutting down")]
        ShutdownInProgress,

        /// Effects were still running when the shutdown deadline passed
        #[error("{0} effects still running at shutdown deadline")]
        ShutdownTimeout(usize),

        /// Nothing arrived before the deadline
        #[error("timed out")]
        Timeout,

        /// Every sender of the action broadcast is gone
        #[error("action broadcast closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

const BROADCAST_CAPACITY: usize = 16;
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

// ============================================================================
// Effect tracking
// ============================================================================

/// Completion handle for the effects of one action
///
/// [`Store::send()`] returns one. It resolves once every effect the action
/// started directly has finished, delayed notices included. Actions those
/// effects feed back get handles of their own.
///
/// ```ignore
/// let mut handle = store.send(BookingAction::SubmitEmail).await?;
/// handle.wait_with_timeout(Duration::from_secs(10)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    running: Arc<AtomicUsize>,
    finished: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectCounter) {
        let running = Arc::new(AtomicUsize::new(0));
        let (notify, finished) = watch::channel(());
        let counter = EffectCounter {
            running: Arc::clone(&running),
            notify: Arc::new(notify),
        };
        (Self { running, finished }, counter)
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        Self::new().0
    }

    /// Effects of this action still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Resolves when no effect of this action is running
    pub async fn wait(&mut self) {
        while self.pending() > 0 && self.finished.changed().await.is_ok() {}
    }

    /// [`wait`](Self::wait) with a deadline
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] if effects are still running after `timeout`.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Write side of an [`EffectHandle`]
#[derive(Clone)]
struct EffectCounter {
    running: Arc<AtomicUsize>,
    notify: Arc<watch::Sender<()>>,
}

/// Held by a running effect task
///
/// Counts the task against its action and against the whole store, and
/// releases both counts when dropped, so a panicking task is released too.
struct EffectGuard {
    action: EffectCounter,
    store: Arc<AtomicUsize>,
}

impl EffectGuard {
    fn start(action: &EffectCounter, store: &Arc<AtomicUsize>) -> Self {
        action.running.fetch_add(1, Ordering::SeqCst);
        store.fetch_add(1, Ordering::SeqCst);
        Self {
            action: action.clone(),
            store: Arc::clone(store),
        }
    }
}

impl Drop for EffectGuard {
    fn drop(&mut self) {
        self.store.fetch_sub(1, Ordering::SeqCst);
        if self.action.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.action.notify.send(());
        }
    }
}

// ============================================================================
// Store
// ============================================================================

struct Shared<S, A, E, R> {
    state: RwLock<S>,
    reducer: R,
    env: E,
    closing: AtomicBool,
    in_flight: Arc<AtomicUsize>,
    /// Effect-produced actions, published before they are reduced
    actions: broadcast::Sender<A>,
}

/// Runtime for one reducer
///
/// Actions are reduced one at a time under the state write lock; their
/// effects run on the tokio runtime. Cloning yields another handle to the
/// same store.
pub struct Store<S, A, E, R> {
    shared: Arc<Shared<S, A, E, R>>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Store over `state` with the default broadcast capacity
    #[must_use]
    pub fn new(state: S, reducer: R, env: E) -> Self {
        Self::with_broadcast_capacity(state, reducer, env, BROADCAST_CAPACITY)
    }

    /// Store whose action broadcast buffers `capacity` actions
    ///
    /// Subscribers further behind than that see `Lagged` and skip ahead.
    #[must_use]
    pub fn with_broadcast_capacity(state: S, reducer: R, env: E, capacity: usize) -> Self {
        let (actions, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                reducer,
                env,
                closing: AtomicBool::new(false),
                in_flight: Arc::new(AtomicUsize::new(0)),
                actions,
            }),
        }
    }

    /// Reduces `action` and starts its effects
    ///
    /// Actions are applied in the order they take the write lock. The
    /// returned handle waits for the effects started here.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once [`Store::shutdown`] was called.
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        self.admit()?;
        metrics::counter!("store.commands.total").increment(1);
        Ok(self.run(action).await)
    }

    fn admit(&self) -> Result<(), StoreError> {
        if self.shared.closing.load(Ordering::Acquire) {
            tracing::warn!("Action refused during shutdown");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }
        Ok(())
    }

    async fn run(&self, action: A) -> EffectHandle {
        let effects = {
            let mut state = self.shared.state.write().await;
            let started = Instant::now();
            let effects = self.shared.reducer.reduce(&mut *state, action, &self.shared.env);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(started.elapsed().as_secs_f64());
            tracing::trace!(effects = effects.len(), "Reduced");
            effects
        };

        let (handle, counter) = EffectHandle::new();
        effects
            .into_iter()
            .for_each(|effect| self.execute_effect(effect, &counter));
        handle
    }

    /// Sends `action`, then waits for an effect-produced action matching `predicate`
    ///
    /// The subscription is taken before sending, so an immediate match is seen.
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] when nothing matches within `timeout`,
    /// [`StoreError::ChannelClosed`] if the broadcast closes, and
    /// [`StoreError::ShutdownInProgress`] from [`send`](Self::send).
    pub async fn send_and_wait_for(
        &self,
        action: A,
        predicate: impl Fn(&A) -> bool,
        timeout: Duration,
    ) -> Result<A, StoreError> {
        let mut rx = self.shared.actions.subscribe();
        self.send(action).await?;

        let matching = async {
            loop {
                match rx.recv().await {
                    Ok(candidate) if predicate(&candidate) => break Ok(candidate),
                    Ok(_) | Err(RecvError::Lagged(_)) => {},
                    Err(RecvError::Closed) => break Err(StoreError::ChannelClosed),
                }
            }
        };
        tokio::time::timeout(timeout, matching)
            .await
            .unwrap_or(Err(StoreError::Timeout))
    }

    /// Receiver for effect-produced actions
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.shared.actions.subscribe()
    }

    /// Reads state through `f` under the read lock
    ///
    /// ```ignore
    /// let seat_count = store.state(|s| s.selected_seats.len()).await;
    /// ```
    pub async fn state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&*self.shared.state.read().await)
    }

    /// Effects still running, across all actions
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Refuses further actions, then waits for running effects
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] carrying the count still running when
    /// `timeout` passes.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.shared.closing.store(true, Ordering::Release);
        tracing::info!(pending = self.pending_effects(), "Store shutting down");

        let drained = async {
            while self.pending_effects() > 0 {
                tokio::time::sleep(SHUTDOWN_POLL).await;
            }
        };
        if tokio::time::timeout(timeout, drained).await.is_err() {
            let pending = self.pending_effects();
            tracing::warn!(pending, "Store shutdown deadline passed");
            return Err(StoreError::ShutdownTimeout(pending));
        }

        tracing::info!("Store shut down");
        Ok(())
    }

    fn spawn_tracked(&self, counter: &EffectCounter, task: impl Future<Output = ()> + Send + 'static) {
        let guard = EffectGuard::start(counter, &self.shared.in_flight);
        tokio::spawn(async move {
            task.await;
            drop(guard);
        });
    }

    fn execute_effect(&self, effect: Effect<A>, counter: &EffectCounter) {
        let kind = match &effect {
            Effect::None => "none",
            Effect::Future(_) => "future",
            Effect::Delay { .. } => "delay",
            Effect::Parallel(_) => "parallel",
            Effect::Sequential(_) => "sequential",
        };
        metrics::counter!("store.effects.executed", "type" => kind).increment(1);

        match effect {
            Effect::None => {},
            Effect::Future(fut) => {
                let store = self.clone();
                self.spawn_tracked(counter, async move {
                    if let Some(action) = fut.await {
                        store.feed_back(action).await;
                    }
                });
            },
            Effect::Delay { duration, action } => {
                tracing::trace!(?duration, "Scheduling delayed action");
                let store = self.clone();
                self.spawn_tracked(counter, async move {
                    tokio::time::sleep(duration).await;
                    store.feed_back(*action).await;
                });
            },
            Effect::Parallel(effects) => {
                for effect in effects {
                    self.execute_effect(effect, counter);
                }
            },
            Effect::Sequential(effects) => {
                let store = self.clone();
                self.spawn_tracked(counter, async move {
                    for effect in effects {
                        let (mut step, step_counter) = EffectHandle::new();
                        store.execute_effect(effect, &step_counter);
                        step.wait().await;
                    }
                });
            },
        }
    }

    async fn feed_back(&self, action: A) {
        // Observers hear about it before the reducer does
        let _ = self.shared.actions.send(action.clone());

        match self.admit() {
            Ok(()) => {
                metrics::counter!("store.feedback.total").increment(1);
                self.run(action).await;
            },
            Err(error) => tracing::debug!(%error, "Dropped effect-produced action"),
        }
    }
}
