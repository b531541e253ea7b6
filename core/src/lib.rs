//! # Todo AI Core
//!
//! The transition contract shared by every state container in the workspace.
//!
//! ## Core Concepts
//!
//! - **State**: Owned, cloneable data held by a store
//! - **Action**: A tagged transition request; one enum variant per named transition
//! - **Reducer**: Pure function `(State, Action) → State`, applied in place
//!
//! Reducers never perform I/O. Anything that talks to the network is sequenced
//! outside the reducer and dispatches the outcome as another action.
//!
//! ## Example
//!
//! ```
//! use todo_ai_core::reducer::Reducer;
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! enum CounterAction {
//!     Increment,
//!     Reset,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!
//!     fn reduce(&self, state: &mut CounterState, action: CounterAction) {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!             CounterAction::Reset => state.count = 0,
//!         }
//!     }
//! }
//!
//! let mut state = CounterState::default();
//! CounterReducer.reduce(&mut state, CounterAction::Increment);
//! assert_eq!(state.count, 1);
//! ```

/// Reducer module - The core trait for transition logic
///
/// Reducers are pure functions: `(State, Action) → State`.
/// They hold every rule about how state may change and are deterministic.
pub mod reducer {
    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The transition type this reducer processes
    ///
    /// Implementations should match exhaustively on `Action` so that adding a
    /// transition is a compile error until every reducer handles it.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// Apply an action to state in place
        ///
        /// Must not fail, block or perform I/O.
        fn reduce(&self, state: &mut Self::State, action: Self::Action);
    }

    impl<R: Reducer + ?Sized> Reducer for std::sync::Arc<R> {
        type State = R::State;
        type Action = R::Action;

        fn reduce(&self, state: &mut Self::State, action: Self::Action) {
            (**self).reduce(state, action);
        }
    }
}

pub use reducer::Reducer;

#[cfg(test)]
mod tests {
    use super::Reducer;
    use std::sync::Arc;

    struct Append;

    impl Reducer for Append {
        type State = Vec<u8>;
        type Action = u8;

        fn reduce(&self, state: &mut Vec<u8>, action: u8) {
            state.push(action);
        }
    }

    #[test]
    fn shared_reducer_delegates() {
        let reducer = Arc::new(Append);
        let mut state = Vec::new();
        reducer.reduce(&mut state, 1);
        reducer.reduce(&mut state, 2);
        assert_eq!(state, vec![1, 2]);
    }
}
