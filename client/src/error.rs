//! Error types for the client.

use crate::config::ConfigError;
use crate::gateway::GatewayError;
use thiserror::Error;
use todo_ai_runtime::StoreError;

/// Message used when a failure carries no text of its own
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Input rejected before any request is sent
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty or whitespace
    #[error("Title is required")]
    EmptyTitle,

    /// Title exceeds the character limit
    #[error("Title must be at most {max} characters (got {length})")]
    TitleTooLong {
        /// Characters supplied
        length: usize,
        /// Allowed maximum
        max: usize,
    },

    /// Description exceeds the character limit
    #[error("Description must be at most {max} characters (got {length})")]
    DescriptionTooLong {
        /// Characters supplied
        length: usize,
        /// Allowed maximum
        max: usize,
    },

    /// Subtask count outside `1..=max`
    #[error("Number of subtasks must be between 1 and {max} (got {requested})")]
    SubtaskCountOutOfRange {
        /// Count requested
        requested: u8,
        /// Allowed maximum
        max: u8,
    },

    /// Language name too short or too long
    #[error("Please select or enter a language (2-50 characters, got {language:?})")]
    InvalidLanguage {
        /// The rejected name, trimmed
        language: String,
    },

    /// Nothing to translate
    #[error("Text to translate is required")]
    EmptyText,
}

/// Any failure an orchestration operation can return
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input was rejected locally
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote service failed or could not be reached
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The store no longer accepts transitions
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Client configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Message recorded in the store and shown to the user
    ///
    /// Server failures surface their `detail`; everything else its display
    /// text. Never empty.
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Gateway(error) => error.user_message(),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// Whether the failure happened before any request was sent
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
