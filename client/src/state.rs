//! State held by the todo store.

use crate::filter::TodoFilter;
use crate::stats::TodoStats;
use crate::types::{Todo, TodoId};

/// In-memory copy of the service's todos plus view flags
///
/// `stats` always describes `todos`; only the reducer writes either.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Loaded todos in service order, then insertion order
    pub todos: Vec<Todo>,
    /// Todo focused by a detail view
    pub selected: Option<Todo>,
    /// A whole-collection operation is in flight
    pub loading: bool,
    /// Last failure message shown to the user
    pub error: Option<String>,
    /// Aggregate counts over `todos`
    pub stats: TodoStats,
}

impl TodoState {
    /// Empty state: no todos, nothing selected, not loading, no error
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a todo by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Whether a todo with this id is loaded
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Whether the selected todo has this id
    #[must_use]
    pub fn is_selected(&self, id: TodoId) -> bool {
        self.selected.as_ref().is_some_and(|t| t.id == id)
    }

    /// The todos a filter lets through, in collection order
    #[must_use]
    pub fn visible(&self, filter: &TodoFilter) -> Vec<&Todo> {
        filter.apply(&self.todos)
    }
}
