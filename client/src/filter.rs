//! List filtering for views.
//!
//! A todo is visible when it passes the status filter and the search text
//! appears, ignoring case, in its title or description. Filtering keeps the
//! input order.

use crate::types::Todo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which todos to show by completion state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every todo
    #[default]
    All,
    /// Only completed todos
    Completed,
    /// Only todos not yet completed
    Pending,
}

impl StatusFilter {
    /// Whether a todo with this completion state passes
    #[must_use]
    pub const fn admits(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Completed => completed,
            Self::Pending => !completed,
        }
    }

    /// Lowercase name used on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status filter name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown status filter {0:?} (expected all, completed or pending)")]
pub struct ParseStatusFilterError(String);

impl FromStr for StatusFilter {
    type Err = ParseStatusFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" | "done" => Ok(Self::Completed),
            "pending" | "open" => Ok(Self::Pending),
            _ => Err(ParseStatusFilterError(s.to_string())),
        }
    }
}

/// Current filter of a list view
///
/// Owned by the view; never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoFilter {
    /// Completion filter
    pub status: StatusFilter,
    /// Case-insensitive substring searched in title and description
    pub search: String,
}

/// Partial filter change; absent fields keep their value
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    /// New status filter
    pub status: Option<StatusFilter>,
    /// New search text
    pub search: Option<String>,
}

impl TodoFilter {
    /// Builds a filter
    #[must_use]
    pub fn new(status: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            status,
            search: search.into(),
        }
    }

    /// Whether a todo passes both the status and the search filter
    #[must_use]
    pub fn matches(&self, todo: &Todo) -> bool {
        self.status.admits(todo.completed) && matches_search(todo, &self.search.to_lowercase())
    }

    /// The passing todos, in input order
    #[must_use]
    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        let needle = self.search.to_lowercase();
        todos
            .iter()
            .filter(|todo| self.status.admits(todo.completed) && matches_search(todo, &needle))
            .collect()
    }

    /// Merges a partial change into this filter
    pub fn update(&mut self, update: FilterUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(search) = update.search {
            self.search = search;
        }
    }

    /// Back to showing everything
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether this filter lets every todo through
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status == StatusFilter::All && self.search.is_empty()
    }
}

/// Filters `todos` by status and search text, keeping input order
#[must_use]
pub fn filter_todos<'a>(todos: &'a [Todo], status: StatusFilter, search: &str) -> Vec<&'a Todo> {
    TodoFilter::new(status, search).apply(todos)
}

fn matches_search(todo: &Todo, needle: &str) -> bool {
    needle.is_empty()
        || todo.title.to_lowercase().contains(needle)
        || todo
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}
