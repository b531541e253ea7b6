//! # Todo AI Testing
//!
//! Testing utilities for reducers and stores.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then builder for reducer transitions
//! - [`drain_actions`]: Collect everything a store has broadcast so far
//!
//! ## Example
//!
//! ```ignore
//! use todo_ai_testing::ReducerTest;
//!
//! ReducerTest::new(TodoReducer)
//!     .given_state(TodoState::default())
//!     .when_action(TodoAction::SetLoading(true))
//!     .then_state(|state| assert!(state.loading))
//!     .run();
//! ```


pub use reducer_test::ReducerTest;

use tokio::sync::broadcast::{self, error::TryRecvError};

/// Drain every action currently buffered in a store subscription
///
/// Stops at the first empty read. Lagged gaps are skipped, so the result is
/// whatever the receiver still holds.
pub fn drain_actions<A: Clone>(rx: &mut broadcast::Receiver<A>) -> Vec<A> {
    let mut actions = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(action) => actions.push(action),
            Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    actions
}
