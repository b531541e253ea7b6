//! Aggregate counts over a todo list.
//!
//! Everything here is a pure function of its input.

use crate::types::{Subtask, Todo};
use serde::{Deserialize, Serialize};

/// Counts shown in the stats panel
///
/// Always `completed + pending == total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoStats {
    /// Number of todos
    pub total: usize,
    /// Number of completed todos
    pub completed: usize,
    /// Number of todos not yet completed
    pub pending: usize,
}

impl TodoStats {
    /// Counts a todo list
    #[must_use]
    pub fn from_todos(todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|t| t.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }

    /// Completed share as a whole percentage, rounded half up; 0 for an empty list
    #[must_use]
    pub fn completion_rate(&self) -> u8 {
        rounded_percentage(self.completed, self.total)
    }
}

/// Aggregates a todo list into [`TodoStats`]
#[must_use]
pub fn compute_stats(todos: &[Todo]) -> TodoStats {
    TodoStats::from_todos(todos)
}

/// Progress through one todo's subtasks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SubtaskProgress {
    /// Completed subtasks
    pub completed: usize,
    /// All subtasks
    pub total: usize,
}

impl SubtaskProgress {
    /// Counts a subtask list
    #[must_use]
    pub fn from_subtasks(subtasks: &[Subtask]) -> Self {
        Self {
            completed: subtasks.iter().filter(|s| s.completed).count(),
            total: subtasks.len(),
        }
    }

    /// Completed share as a whole percentage; 0 when there are no subtasks
    #[must_use]
    pub fn percentage(&self) -> u8 {
        rounded_percentage(self.completed, self.total)
    }

    /// Whether every subtask is done (false when there are none)
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

fn rounded_percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 200 + whole) / (whole * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
