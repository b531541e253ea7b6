//! Domain types shared with the remote todo service.
//!
//! Records mirror the service's JSON shapes. Identifiers are integers assigned
//! by the service; the client never invents them.

use crate::error::ValidationError;
use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a todo title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum length of a todo description, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Upper bound on subtasks requested in one generation call
pub const MAX_SUBTASKS: u8 = 10;

/// Subtasks requested when the caller does not say
pub const DEFAULT_MAX_SUBTASKS: u8 = 5;

/// Shortest accepted target language name
pub const MIN_LANGUAGE_LENGTH: usize = 2;

/// Longest accepted target language name
pub const MAX_LANGUAGE_LENGTH: usize = 50;

/// Languages offered as presets; any other name is accepted too
pub const COMMON_LANGUAGES: [&str; 15] = [
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Chinese",
    "Japanese",
    "Korean",
    "Arabic",
    "Russian",
    "Hindi",
    "Dutch",
    "Swedish",
    "Norwegian",
    "Danish",
];

macro_rules! service_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

service_id!(
    /// Identifier of a todo
    TodoId
);
service_id!(
    /// Identifier of a subtask
    SubtaskId
);
service_id!(
    /// Identifier of a stored translation
    TranslationId
);

/// A todo with its subtasks and translations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Service-assigned identifier
    pub id: TodoId,
    /// Title, never empty
    pub title: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the todo is done
    pub completed: bool,
    /// When the service created it
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// When the service last changed it
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Subtasks in storage order; display order is `order_index`
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Every translation fetched so far, duplicates included
    #[serde(default)]
    pub translations: Vec<Translation>,
}

impl Todo {
    /// Subtasks sorted for display
    ///
    /// Sorted by `order_index`; equal indexes keep their stored order.
    #[must_use]
    pub fn sorted_subtasks(&self) -> Vec<&Subtask> {
        let mut subtasks: Vec<&Subtask> = self.subtasks.iter().collect();
        subtasks.sort_by_key(|s| s.order_index);
        subtasks
    }

    /// First translation whose language matches, ignoring case
    #[must_use]
    pub fn translation_for(&self, language: &str) -> Option<&Translation> {
        let language = language.trim().to_lowercase();
        self.translations
            .iter()
            .find(|t| t.language.to_lowercase() == language)
    }

    /// Text to show for this todo
    ///
    /// Without a selected language, or without a matching translation, the
    /// original title and description are returned. A translation without a
    /// translated description keeps the original description.
    #[must_use]
    pub fn localized(&self, selected_language: Option<&str>) -> LocalizedText<'_> {
        let original = LocalizedText {
            title: &self.title,
            description: self.description.as_deref(),
            language: None,
        };

        let Some(translation) = selected_language.and_then(|l| self.translation_for(l)) else {
            return original;
        };

        LocalizedText {
            title: if translation.translated_title.is_empty() {
                &self.title
            } else {
                &translation.translated_title
            },
            description: translation
                .translated_description
                .as_deref()
                .or(original.description),
            language: Some(&translation.language),
        }
    }
}

/// Text of a todo as shown to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalizedText<'a> {
    /// Title to display
    pub title: &'a str,
    /// Description to display, if any
    pub description: Option<&'a str>,
    /// Language of the translation used, `None` for the original text
    pub language: Option<&'a str>,
}

/// An ordered sub-item of a todo
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Service-assigned identifier
    pub id: SubtaskId,
    /// Parent todo, when the service reports it
    #[serde(default)]
    pub todo_id: Option<TodoId>,
    /// Short title
    pub title: String,
    /// Optional details
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the subtask is done
    pub completed: bool,
    /// Display position
    #[serde(default)]
    pub order_index: i32,
    /// When the service created it
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A stored translation of a todo's title and description
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Service-assigned identifier
    pub id: TranslationId,
    /// Parent todo, when the service reports it
    #[serde(default)]
    pub todo_id: Option<TodoId>,
    /// Free-form language name, matched without regard to case
    pub language: String,
    /// Translated title
    pub translated_title: String,
    /// Translated description, if the todo had one
    #[serde(default)]
    pub translated_description: Option<String>,
    /// When the service produced it
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Result of translating free text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTranslation {
    /// The translated text
    pub translated_text: String,
    /// The text that was sent
    #[serde(default)]
    pub original_text: Option<String>,
    /// The language it was translated to
    #[serde(default)]
    pub target_language: Option<String>,
}

/// Request body for creating a todo
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewTodo {
    /// Title, trimmed
    pub title: String,
    /// Description, `None` when blank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTodo {
    /// Builds a creation request, trimming the title and dropping a blank description
    #[must_use]
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            description: normalize_description(description),
        }
    }

    /// Checks the title and description limits
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())
    }
}

/// Request body for updating a todo; absent fields are left unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoChanges {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoChanges {
    /// Sets the title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into().trim().to_string());
        self
    }

    /// Sets the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the completion state
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Whether no field is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Checks the limits of whichever fields are set
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_description(self.description.as_deref())
    }
}

/// Request body for updating a subtask; absent fields are left unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SubtaskChanges {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// New display position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

impl SubtaskChanges {
    /// Changes only the completion state
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Checks the title limit when a title is set
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or overlong title.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// A partial todo merged field by field into the stored record
///
/// Fields left `None` keep their current value. `description` and
/// `updated_at` distinguish "absent" (`None`) from "cleared" (`Some(None)`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// Todo to merge into
    pub id: TodoId,
    /// Replacement title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement description
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    /// Replacement completion state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Replacement creation time
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Replacement modification time
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<Option<DateTime<Utc>>>,
    /// Replacement subtask collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
    /// Replacement translation collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<Translation>>,
}

impl TodoPatch {
    /// A patch that changes nothing
    #[must_use]
    pub const fn new(id: TodoId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            completed: None,
            created_at: None,
            updated_at: None,
            subtasks: None,
            translations: None,
        }
    }

    /// Sets the title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets (or clears) the description
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Sets the completion state
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Merges the present fields into `todo`
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            todo.description.clone_from(description);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(created_at) = self.created_at {
            todo.created_at = created_at;
        }
        if let Some(updated_at) = self.updated_at {
            todo.updated_at = updated_at;
        }
        if let Some(subtasks) = &self.subtasks {
            todo.subtasks.clone_from(subtasks);
        }
        if let Some(translations) = &self.translations {
            todo.translations.clone_from(translations);
        }
    }
}

impl From<Todo> for TodoPatch {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: Some(todo.title),
            description: Some(todo.description),
            completed: Some(todo.completed),
            created_at: Some(todo.created_at),
            updated_at: Some(todo.updated_at),
            subtasks: Some(todo.subtasks),
            translations: Some(todo.translations),
        }
    }
}

// A field that is present deserializes to `Some`, even when it is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

pub(crate) fn validate_title(title: &str) -> Result<(), ValidationError> {
    let length = title.trim().chars().count();
    if length == 0 {
        return Err(ValidationError::EmptyTitle);
    }
    if length > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong {
            length,
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(())
}

pub(crate) fn validate_description(description: Option<&str>) -> Result<(), ValidationError> {
    let length = description.map_or(0, |d| d.chars().count());
    if length > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::DescriptionTooLong {
            length,
            max: MAX_DESCRIPTION_LENGTH,
        });
    }
    Ok(())
}

pub(crate) fn validate_language(language: &str) -> Result<(), ValidationError> {
    let length = language.trim().chars().count();
    if !(MIN_LANGUAGE_LENGTH..=MAX_LANGUAGE_LENGTH).contains(&length) {
        return Err(ValidationError::InvalidLanguage {
            language: language.trim().to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_max_subtasks(max_subtasks: u8) -> Result<(), ValidationError> {
    if !(1..=MAX_SUBTASKS).contains(&max_subtasks) {
        return Err(ValidationError::SubtaskCountOutOfRange {
            requested: max_subtasks,
            max: MAX_SUBTASKS,
        });
    }
    Ok(())
}
