//! Reducer logic for the todo store.
//!
//! Each [`TodoAction`] maps to exactly one state change. Every transition that
//! can touch the collection recomputes `stats`, so the counts can never drift
//! from the list.

use crate::actions::TodoAction;
use crate::state::TodoState;
use crate::stats::TodoStats;
use crate::types::{Todo, TodoId};
use todo_ai_core::reducer::Reducer;
use todo_ai_runtime::Store;

/// The todo state container
pub type TodoStore = Store<TodoState, TodoAction, TodoReducer>;

/// Reducer for the todo store
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// A store holding an empty [`TodoState`]
    #[must_use]
    pub fn store() -> TodoStore {
        Store::new(TodoState::new(), Self)
    }

    /// Runs `f` on the todo with `id` and on the selection if it is the same todo
    fn modify(state: &mut TodoState, id: TodoId, f: impl Fn(&mut Todo)) {
        if let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) {
            f(todo);
        }
        if let Some(selected) = state.selected.as_mut().filter(|t| t.id == id) {
            f(selected);
        }
    }

    /// Common tail of every collection transition
    fn settle(state: &mut TodoState) {
        state.stats = TodoStats::from_todos(&state.todos);
        state.loading = false;
        state.error = None;
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;

    fn reduce(&self, state: &mut TodoState, action: TodoAction) {
        tracing::debug!(
            action = action.name(),
            collection = action.affects_collection(),
            "Applying transition"
        );

        match action {
            TodoAction::SetTodos(todos) => {
                state.todos = todos;
                Self::settle(state);
            }

            TodoAction::AddTodo(todo) => {
                state.todos.push(todo);
                Self::settle(state);
            }

            TodoAction::UpdateTodo(patch) => {
                Self::modify(state, patch.id, |todo| patch.apply_to(todo));
                Self::settle(state);
            }

            TodoAction::DeleteTodo(id) => {
                state.todos.retain(|t| t.id != id);
                if state.is_selected(id) {
                    state.selected = None;
                }
                Self::settle(state);
            }

            TodoAction::ToggleTodo(todo) => {
                Self::modify(state, todo.id, |current| current.clone_from(&todo));
                Self::settle(state);
            }

            TodoAction::SetSelected(todo) => {
                state.selected = todo;
                state.loading = false;
            }

            TodoAction::AddSubtasks { todo_id, subtasks } => {
                Self::modify(state, todo_id, |todo| todo.subtasks.clone_from(&subtasks));
                Self::settle(state);
            }

            TodoAction::AddTranslation {
                todo_id,
                translation,
            } => {
                Self::modify(state, todo_id, |todo| {
                    todo.translations.push(translation.clone());
                });
                Self::settle(state);
            }

            TodoAction::SetLoading(loading) => {
                state.loading = loading;
                state.error = None;
            }

            TodoAction::SetError(message) => {
                state.loading = false;
                state.error = Some(message);
            }

            TodoAction::ClearError => {
                state.error = None;
            }
        }
    }
}
