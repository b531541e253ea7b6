//! Remote gateway to the todo service.
//!
//! [`TodoGateway`] is the seam between orchestration and transport. The
//! service holds it as `Arc<dyn TodoGateway>`, so production code talks HTTP
//! through [`HttpGateway`] and tests drive the in-memory [`MockGateway`].

mod error;
mod http;
pub mod mock;

pub use error::GatewayError;
pub use http::HttpGateway;
pub use mock::{GatewayCall, MockGateway};

use crate::types::{
    NewTodo, Subtask, SubtaskChanges, SubtaskId, TextTranslation, Todo, TodoChanges, TodoId,
    TodoPatch, Translation,
};
use async_trait::async_trait;

/// Result type for gateway calls
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Operations offered by the remote todo service
///
/// Every method is one request. Implementations never touch client state.
#[async_trait]
pub trait TodoGateway: Send + Sync {
    /// Lists todos with their subtasks and translations
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the service rejects it.
    async fn list_todos(&self, skip: usize, limit: usize) -> Result<Vec<Todo>>;

    /// Fetches one todo with its relations
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Server`] with status 404 for an unknown id.
    async fn get_todo(&self, id: TodoId) -> Result<Todo>;

    /// Creates a todo
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the service rejects it.
    async fn create_todo(&self, todo: &NewTodo) -> Result<Todo>;

    /// Updates the given fields of a todo
    ///
    /// The response is read as a patch: relations the service leaves out are
    /// kept by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the service rejects it.
    async fn update_todo(&self, id: TodoId, changes: &TodoChanges) -> Result<TodoPatch>;

    /// Deletes a todo
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the service rejects it.
    async fn delete_todo(&self, id: TodoId) -> Result<()>;

    /// Flips the completion state on the service and returns the new record
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the service rejects it.
    async fn toggle_todo(&self, id: TodoId) -> Result<Todo>;

    /// Asks the service to generate up to `max_subtasks` subtasks
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or generation fails.
    async fn generate_subtasks(&self, id: TodoId, max_subtasks: u8) -> Result<Vec<Subtask>>;

    /// Translates a todo and stores the translation on the service
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or translation fails.
    async fn translate_todo(&self, id: TodoId, target_language: &str) -> Result<Translation>;

    /// Translates free text without storing anything
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or translation fails.
    async fn translate_text(&self, text: &str, target_language: &str) -> Result<TextTranslation>;

    /// Lists the complete subtask set of a todo
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Server`] with status 404 for an unknown todo.
    async fn list_subtasks(&self, id: TodoId) -> Result<Vec<Subtask>>;

    /// Lists every stored translation of a todo
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Server`] with status 404 for an unknown todo.
    async fn list_translations(&self, id: TodoId) -> Result<Vec<Translation>>;

    /// Updates the given fields of a subtask
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the service rejects it.
    async fn update_subtask(&self, id: SubtaskId, changes: &SubtaskChanges) -> Result<Subtask>;

    /// Deletes a subtask
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or the service rejects it.
    async fn delete_subtask(&self, id: SubtaskId) -> Result<()>;
}
