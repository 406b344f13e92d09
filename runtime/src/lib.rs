//! # TodoMVC Runtime
//!
//! Runtime implementation for the TodoMVC reducer architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Batches**: Several actions reduced under one lock before any effect runs
//!
//! ## Example
//!
//! ```ignore
//! use todomvc_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Wait until every spawned effect (and the actions they fed back) finished
//! store.settle(Duration::from_secs(5)).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use todomvc_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned when `send()` is called after shutdown was initiated.
        /// Actions fed back by in-flight effects are still processed.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Waiting for the store to become idle timed out
        #[error("Timed out waiting for {0} pending effects")]
        SettleTimeout(usize),
    }
}

pub use error::StoreError;
pub use store::Store;

/// Decrements the pending-effect counter on drop and wakes idle waiters
/// when it reaches zero.
///
/// Dropping happens even if the effect future panics.
struct PendingGuard {
    pending: Arc<AtomicUsize>,
    idle: Arc<watch::Sender<()>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.send_replace(());
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, Duration, Effect, Ordering, PendingGuard, Reducer,
        RwLock, StoreError, watch,
    };
    use futures::future::{BoxFuture, join_all};
    use tokio::sync::broadcast;

    /// Default capacity of the action broadcast channel
    const DEFAULT_BROADCAST_CAPACITY: usize = 64;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        idle: Arc<watch::Sender<()>>,
        /// Every reduced action is broadcast, so observers can recompute
        /// derived views when the state changes.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Clone + Send + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(
                initial_state,
                reducer,
                environment,
                DEFAULT_BROADCAST_CAPACITY,
            )
        }

        /// Create a store with a custom action broadcast capacity
        ///
        /// Slow observers skip actions once they fall `capacity` actions behind.
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));
            let (idle, _) = watch::channel(());

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                idle: Arc::new(idle),
                action_broadcast,
            }
        }

        /// Send a single action to the store
        ///
        /// The action is reduced immediately; effects it returns are spawned
        /// and may still be running when this returns.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            self.send_batch(std::iter::once(action)).await
        }

        /// Send several actions as one logical batch
        ///
        /// All actions are reduced in order under a single write lock, and only
        /// then are their effects executed. An effect scheduled by the first
        /// action therefore observes every mutation made by the rest of the
        /// batch.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, actions), name = "store_send_batch")]
        pub async fn send_batch<I>(&self, actions: I) -> Result<(), StoreError>
        where
            I: IntoIterator<Item = A>,
        {
            if self.shutdown.load(Ordering::SeqCst) {
                tracing::warn!("Rejecting actions, store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }

            let actions: Vec<A> = actions.into_iter().collect();
            self.dispatch(actions).await;
            Ok(())
        }

        /// Reduce a batch and execute the resulting effects
        async fn dispatch(&self, actions: Vec<A>) {
            let effects = {
                let mut state = self.state.write().await;
                let mut effects = Vec::new();

                for action in actions {
                    tracing::trace!(?action, "Reducing action");
                    metrics::counter!("store.actions.reduced").increment(1);

                    // No receivers is fine, nobody is watching
                    let _ = self.action_broadcast.send(action.clone());

                    effects.extend(self.reducer.reduce(&mut *state, action, &self.environment));
                }

                effects
            };

            for effect in effects {
                self.execute_effect(effect);
            }
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let todo_count = store.state(|s| s.collection.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to every action reduced by this store
        ///
        /// Includes actions sent by callers and actions fed back by effects.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Number of effects currently in flight
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::SeqCst)
        }

        /// Wait until no effect is in flight
        ///
        /// Effects that feed actions back keep the store busy until the
        /// effects of those actions finish too, so returning `Ok` means the
        /// whole cascade is done.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::SettleTimeout`] if effects are still running
        /// when the timeout expires.
        pub async fn settle(&self, timeout: Duration) -> Result<(), StoreError> {
            let mut idle = self.idle.subscribe();
            let pending = Arc::clone(&self.pending_effects);

            let waited = tokio::time::timeout(timeout, async move {
                while pending.load(Ordering::SeqCst) > 0 {
                    if idle.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await;

            waited.map_err(|_| StoreError::SettleTimeout(self.pending_effects()))
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Rejects new actions, then waits for in-flight effects.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::SeqCst);

            match self.settle(timeout).await {
                Ok(()) => {
                    tracing::info!("Graceful shutdown completed");
                    Ok(())
                },
                Err(_) => {
                    let remaining = self.pending_effects();
                    tracing::warn!(remaining, "Shutdown timed out with effects still running");
                    Err(StoreError::ShutdownTimeout(remaining))
                },
            }
        }

        /// Register an in-flight effect
        fn track(&self) -> PendingGuard {
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            PendingGuard {
                pending: Arc::clone(&self.pending_effects),
                idle: Arc::clone(&self.idle),
            }
        }

        /// Send an action produced by an effect back into the store
        ///
        /// Feedback bypasses the shutdown check so in-flight work can finish.
        async fn feed_back(&self, action: A) {
            tracing::trace!("Effect produced an action, sending to store");
            self.dispatch(vec![action]).await;
        }

        /// Execute an effect
        ///
        /// - `None`: No-op
        /// - `Future`: Spawned; a resulting action is fed back
        /// - `Parallel`: Each child executed independently
        /// - `Sequential`: Spawned; children run in order, each (with its
        ///   feedback) finishing before the next starts
        fn execute_effect(&self, effect: Effect<A>) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                    let guard = self.track();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;

                        if let Some(action) = fut.await {
                            store.feed_back(action).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                    for effect in effects {
                        self.execute_effect(effect);
                    }
                },
                Effect::Sequential(effects) => {
                    tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);

                    let guard = self.track();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;

                        for effect in effects {
                            store.run_to_completion(effect).await;
                        }
                        tracing::trace!("Effect::Sequential completed");
                    });
                },
            }
        }

        /// Run an effect inline, resolving once it and its feedback are done
        fn run_to_completion(&self, effect: Effect<A>) -> BoxFuture<'static, ()> {
            match effect {
                Effect::None => Box::pin(async {}),
                Effect::Future(fut) => {
                    let store = self.clone();
                    Box::pin(async move {
                        if let Some(action) = fut.await {
                            store.feed_back(action).await;
                        }
                    })
                },
                Effect::Parallel(effects) => {
                    let children: Vec<_> = effects
                        .into_iter()
                        .map(|effect| self.run_to_completion(effect))
                        .collect();
                    Box::pin(async move {
                        join_all(children).await;
                    })
                },
                Effect::Sequential(effects) => {
                    let store = self.clone();
                    Box::pin(async move {
                        for effect in effects {
                            store.run_to_completion(effect).await;
                        }
                    })
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                idle: Arc::clone(&self.idle),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}
