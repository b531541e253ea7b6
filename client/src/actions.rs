//! Transitions of the todo store.

use crate::types::{Subtask, Todo, TodoId, TodoPatch, Translation};

/// Every named transition the todo store accepts
///
/// Transitions carry results the remote service already confirmed; the store
/// never applies anything optimistically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Replace the whole collection
    SetTodos(Vec<Todo>),

    /// Append a newly created todo
    AddTodo(Todo),

    /// Merge the present fields into the matching todo (and the selection)
    UpdateTodo(TodoPatch),

    /// Remove a todo, clearing the selection if it was selected
    DeleteTodo(TodoId),

    /// Replace the matching todo with the service's record after a toggle
    ToggleTodo(Todo),

    /// Focus a todo for detail views, or clear the focus
    SetSelected(Option<Todo>),

    /// Replace a todo's subtask collection wholesale
    AddSubtasks {
        /// Parent todo
        todo_id: TodoId,
        /// The complete new subtask set
        subtasks: Vec<Subtask>,
    },

    /// Append one translation to a todo; duplicates are kept
    AddTranslation {
        /// Parent todo
        todo_id: TodoId,
        /// Translation to append
        translation: Translation,
    },

    /// Set the global loading flag (also clears the error)
    SetLoading(bool),

    /// Record a failure message (also clears loading)
    SetError(String),

    /// Forget the last failure message
    ClearError,
}

impl TodoAction {
    /// Short name for logs and metrics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetTodos(_) => "set_todos",
            Self::AddTodo(_) => "add_todo",
            Self::UpdateTodo(_) => "update_todo",
            Self::DeleteTodo(_) => "delete_todo",
            Self::ToggleTodo(_) => "toggle_todo",
            Self::SetSelected(_) => "set_selected",
            Self::AddSubtasks { .. } => "add_subtasks",
            Self::AddTranslation { .. } => "add_translation",
            Self::SetLoading(_) => "set_loading",
            Self::SetError(_) => "set_error",
            Self::ClearError => "clear_error",
        }
    }

    /// Whether the transition can change the todo collection
    #[must_use]
    pub const fn affects_collection(&self) -> bool {
        matches!(
            self,
            Self::SetTodos(_)
                | Self::AddTodo(_)
                | Self::UpdateTodo(_)
                | Self::DeleteTodo(_)
                | Self::ToggleTodo(_)
                | Self::AddSubtasks { .. }
                | Self::AddTranslation { .. }
        )
    }
}
