//! # Todo AI Runtime
//!
//! Runtime implementation of the state container.
//!
//! The [`Store`] owns a piece of state, applies actions to it through a
//! [`Reducer`], and lets observers follow every applied action.
//!
//! ## Core Components
//!
//! - **Store**: State behind an async `RwLock`, one writer at a time
//! - **Action broadcast**: Every applied action is re-published to subscribers
//! - **Shutdown flag**: Once set, late actions are rejected instead of applied
//!
//! ## Example
//!
//! ```ignore
//! use todo_ai_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer);
//!
//! // Apply a transition
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use todo_ai_core::reducer::Reducer;
use tokio::sync::RwLock;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned when `send()` is called after `shutdown()`. Responses that
        /// arrive after their consumer went away end up here instead of being
        /// applied to state nobody is looking at.
        #[error("Store is shutting down")]
        ShutdownInProgress,
    }
}

pub use error::StoreError;

/// Default number of actions buffered for each broadcast subscriber
pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

/// Store module - the state container
pub mod store {
    use super::{Arc, AtomicBool, Ordering, Reducer, RwLock, StoreError};
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (transition logic)
    /// 3. Action broadcast (observers see every applied action, in order)
    ///
    /// Cloning a Store is cheap and yields a handle to the same state.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        shutdown: Arc<AtomicBool>,
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, R> Store<S, A, R>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
    {
        /// Create a new store with initial state and reducer
        ///
        /// Uses an action broadcast capacity of [`DEFAULT_BROADCAST_CAPACITY`].
        ///
        /// [`DEFAULT_BROADCAST_CAPACITY`]: crate::DEFAULT_BROADCAST_CAPACITY
        #[must_use]
        pub fn new(initial_state: S, reducer: R) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, crate::DEFAULT_BROADCAST_CAPACITY)
        }

        /// Create a new Store with custom action broadcast capacity
        ///
        /// Increase the capacity when observers are slow and frequently lag.
        ///
        /// # Panics
        ///
        /// Panics if `capacity` is zero (a `tokio::sync::broadcast` requirement).
        #[must_use]
        pub fn with_broadcast_capacity(initial_state: S, reducer: R, capacity: usize) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                shutdown: Arc::new(AtomicBool::new(false)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action)
        /// 3. Publishes the action to subscribers before releasing the lock,
        ///    so observers see actions in application order
        ///
        /// Concurrent `send()` calls serialize on the write lock; each
        /// transition is applied atomically.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.actions.total").increment(1);

            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let start = std::time::Instant::now();
            self.reducer.reduce(&mut *state, action.clone());
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            // No subscribers is fine
            let _ = self.action_broadcast.send(action);
            tracing::trace!("Action applied");

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released promptly:
        ///
        /// ```ignore
        /// let todo_count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Clone the whole current state
        pub async fn snapshot(&self) -> S
        where
            S: Clone,
        {
            self.state(S::clone).await
        }

        /// Subscribe to all actions applied by this store
        ///
        /// The receiver gets a clone of every action applied after the call.
        /// Slow receivers skip old actions and observe `RecvError::Lagged`.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Stop accepting actions
        ///
        /// Every later `send()` returns [`StoreError::ShutdownInProgress`].
        /// State stays readable.
        pub fn shutdown(&self) {
            tracing::info!("Store shutting down");
            metrics::counter!("store.shutdown.initiated").increment(1);
            self.shutdown.store(true, Ordering::Release);
        }

        /// Whether `shutdown()` has been called
        #[must_use]
        pub fn is_shutdown(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }
    }

    impl<S, A, R> Clone for Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                shutdown: Arc::clone(&self.shutdown),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;
