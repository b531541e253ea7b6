//! Scoped in-flight flags.
//!
//! A [`BusyGuard`] marks one operation on one target as running for as long as
//! it lives. Dropping the guard clears the mark, whether the operation
//! returned, failed or its future was dropped mid-flight.

use crate::types::{SubtaskId, TodoId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Orchestration operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Load the whole collection
    Load,
    /// Fetch one todo for a detail view
    Details,
    /// Create a todo
    Create,
    /// Update a todo
    Update,
    /// Delete a todo
    Delete,
    /// Toggle completion of a todo
    Toggle,
    /// Generate subtasks for a todo
    GenerateSubtasks,
    /// Translate a todo
    Translate,
    /// Translate free text
    TranslateText,
    /// Update a subtask
    UpdateSubtask,
    /// Delete a subtask
    DeleteSubtask,
    /// Re-fetch the subtasks of a todo
    RefreshSubtasks,
    /// Re-fetch the translations of a todo
    RefreshTranslations,
}

impl Operation {
    /// Name used in logs and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Details => "details",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Toggle => "toggle",
            Self::GenerateSubtasks => "generate_subtasks",
            Self::Translate => "translate",
            Self::TranslateText => "translate_text",
            Self::UpdateSubtask => "update_subtask",
            Self::DeleteSubtask => "delete_subtask",
            Self::RefreshSubtasks => "refresh_subtasks",
            Self::RefreshTranslations => "refresh_translations",
        }
    }

    /// Fixed notice text shown on failure instead of the error message
    pub(crate) const fn failure_notice(self) -> Option<&'static str> {
        match self {
            Self::GenerateSubtasks => Some("Failed to generate subtasks"),
            Self::Translate => Some("Translation failed"),
            _ => None,
        }
    }

    /// Whether a failure is recorded in the store's `error` field
    pub(crate) const fn records_error(self) -> bool {
        !matches!(self, Self::TranslateText)
    }
}

/// What an in-flight operation works on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusyTarget {
    /// A todo
    Todo(TodoId),
    /// A subtask
    Subtask(SubtaskId),
}

type BusyKey = (Operation, Option<BusyTarget>);

/// Counts of in-flight operations per `(operation, target)`
///
/// Clones share the same counts.
#[derive(Clone, Debug, Default)]
pub struct BusyFlags {
    counts: Arc<Mutex<HashMap<BusyKey, usize>>>,
}

impl BusyFlags {
    /// No operation in flight
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `operation` on `target` as running until the guard drops
    #[must_use = "the flag clears as soon as the guard is dropped"]
    pub fn acquire(&self, operation: Operation, target: Option<BusyTarget>) -> BusyGuard {
        let key = (operation, target);
        *self.lock().entry(key).or_insert(0) += 1;
        tracing::trace!(operation = operation.as_str(), ?target, "Busy");
        BusyGuard {
            flags: self.clone(),
            key,
        }
    }

    /// Whether `operation` is running on any target
    #[must_use]
    pub fn is_busy(&self, operation: Operation) -> bool {
        self.lock().keys().any(|(op, _)| *op == operation)
    }

    /// Whether `operation` is running on exactly this target
    #[must_use]
    pub fn is_busy_for(&self, operation: Operation, target: Option<BusyTarget>) -> bool {
        self.lock().contains_key(&(operation, target))
    }

    /// Number of operations currently running
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.lock().values().sum()
    }

    fn release(&self, key: BusyKey) {
        let mut counts = self.lock();
        if let Some(count) = counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                counts.remove(&key);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BusyKey, usize>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps one in-flight flag set; clears it on drop
#[derive(Debug)]
pub struct BusyGuard {
    flags: BusyFlags,
    key: BusyKey,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flags.release(self.key);
    }
}
