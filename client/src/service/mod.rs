//! Orchestration of gateway calls and store transitions.
//!
//! Every [`TodoService`] operation follows the same shape:
//!
//! 1. Validate input locally
//! 2. Mark the operation busy for its target ([`BusyGuard`])
//! 3. `SetLoading(true)`, which also clears the previous error
//! 4. Await the gateway, then apply the confirmed result to the store
//! 5. On failure: `SetError(message)`, an error [`Notice`], and the error is returned
//!
//! Nothing is applied optimistically. Generation, translation and subtask
//! edits are followed by a full reload instead of merging their responses.

mod busy;
mod notice;

pub use busy::{BusyFlags, BusyGuard, BusyTarget, Operation};
pub use notice::{Notice, NoticeLevel};

use crate::actions::TodoAction;
use crate::config::ClientConfig;
use crate::error::{ClientError, ValidationError};
use crate::filter::TodoFilter;
use crate::gateway::{HttpGateway, TodoGateway};
use crate::reducer::{TodoReducer, TodoStore};
use crate::state::TodoState;
use crate::stats::TodoStats;
use crate::types::{
    NewTodo, Subtask, SubtaskChanges, SubtaskId, TextTranslation, Todo, TodoChanges, TodoId,
    TodoPatch, Translation, validate_language, validate_max_subtasks,
};
use std::future::Future;
use std::sync::Arc;
use todo_ai_runtime::DEFAULT_BROADCAST_CAPACITY;
use tokio::sync::broadcast;

/// Client-side façade over the todo store and the remote gateway
///
/// Cloning is cheap; clones share the store, the gateway and the busy flags.
#[derive(Clone)]
pub struct TodoService {
    store: TodoStore,
    gateway: Arc<dyn TodoGateway>,
    busy: BusyFlags,
    notices: broadcast::Sender<Notice>,
    page_size: usize,
}

impl TodoService {
    /// A service with an empty store
    #[must_use]
    pub fn new(gateway: Arc<dyn TodoGateway>) -> Self {
        Self::with_store(TodoReducer::store(), gateway)
    }

    /// A service around an existing store
    #[must_use]
    pub fn with_store(store: TodoStore, gateway: Arc<dyn TodoGateway>) -> Self {
        let (notices, _) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            store,
            gateway,
            busy: BusyFlags::new(),
            notices,
            page_size: crate::config::DEFAULT_PAGE_SIZE,
        }
    }

    /// A service talking HTTP to the configured base URL
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for an invalid configuration and
    /// [`ClientError::Gateway`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let gateway = HttpGateway::new(config)?;
        Ok(Self::new(Arc::new(gateway)).with_page_size(config.page_size))
    }

    /// Sets the `limit` used when (re)loading the collection
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    // Operations

    /// Loads the collection from the service
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails; the store records the message.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<(), ClientError> {
        self.run(Operation::Load, None, async {
            self.begin().await?;
            self.reload().await
        })
        .await
    }

    /// Fetches one todo and selects it
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails; the store records the message.
    #[tracing::instrument(skip(self))]
    pub async fn details(&self, id: TodoId) -> Result<Todo, ClientError> {
        self.run(Operation::Details, Some(BusyTarget::Todo(id)), async {
            self.begin().await?;
            let todo = self.gateway.get_todo(id).await?;
            self.store.send(TodoAction::SetSelected(Some(todo.clone()))).await?;
            Ok(todo)
        })
        .await
    }

    /// Creates a todo and appends it to the collection
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for an empty or overlong title or
    /// description, otherwise any gateway or store failure.
    #[tracing::instrument(skip(self, todo), fields(title = %todo.title))]
    pub async fn create(&self, todo: NewTodo) -> Result<Todo, ClientError> {
        self.run(Operation::Create, None, async {
            todo.validate()?;
            self.begin().await?;
            let created = self.gateway.create_todo(&todo).await?;
            self.store.send(TodoAction::AddTodo(created.clone())).await?;
            tracing::info!(id = %created.id, "Todo created");
            self.notify(Notice::success("Todo created successfully!"));
            Ok(created)
        })
        .await
    }

    /// Updates the given fields of a todo
    ///
    /// The service's answer is merged into the stored todo; relations it
    /// leaves out are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for invalid fields, otherwise any
    /// gateway or store failure.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update(&self, id: TodoId, changes: TodoChanges) -> Result<TodoPatch, ClientError> {
        self.run(Operation::Update, Some(BusyTarget::Todo(id)), async {
            changes.validate()?;
            self.begin().await?;
            let patch = self.gateway.update_todo(id, &changes).await?;
            if self.apply_if_loaded(id, TodoAction::UpdateTodo(patch.clone())).await? {
                tracing::info!(%id, "Todo updated");
            }
            self.notify(Notice::success("Todo updated successfully!"));
            Ok(patch)
        })
        .await
    }

    /// Deletes a todo
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails; the store records the message.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: TodoId) -> Result<(), ClientError> {
        self.run(Operation::Delete, Some(BusyTarget::Todo(id)), async {
            self.begin().await?;
            self.gateway.delete_todo(id).await?;
            self.store.send(TodoAction::DeleteTodo(id)).await?;
            tracing::info!(%id, "Todo deleted");
            self.notify(Notice::success("Todo deleted successfully!"));
            Ok(())
        })
        .await
    }

    /// Flips completion on the service and stores the returned record
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails; the store records the message.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, id: TodoId) -> Result<Todo, ClientError> {
        self.run(Operation::Toggle, Some(BusyTarget::Todo(id)), async {
            self.begin().await?;
            let todo = self.gateway.toggle_todo(id).await?;
            self.apply_if_loaded(id, TodoAction::ToggleTodo(todo.clone())).await?;
            self.notify(Notice::success(if todo.completed {
                "Todo completed!"
            } else {
                "Todo marked as pending"
            }));
            Ok(todo)
        })
        .await
    }

    /// Asks the service for up to `max_subtasks` subtasks, then reloads
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] unless `1 <= max_subtasks <= 10`,
    /// otherwise any gateway or store failure. The collection is left as it
    /// was when generation fails.
    #[tracing::instrument(skip(self))]
    pub async fn generate_subtasks(
        &self,
        id: TodoId,
        max_subtasks: u8,
    ) -> Result<Vec<Subtask>, ClientError> {
        self.run(Operation::GenerateSubtasks, Some(BusyTarget::Todo(id)), async {
            validate_max_subtasks(max_subtasks)?;
            self.begin().await?;
            let subtasks = self.gateway.generate_subtasks(id, max_subtasks).await?;
            self.reload().await?;
            tracing::info!(%id, count = subtasks.len(), "Subtasks generated");
            self.notify(Notice::success(format!(
                "Generated {} subtasks!",
                subtasks.len()
            )));
            Ok(subtasks)
        })
        .await
    }

    /// Translates a todo on the service, then reloads
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a language name outside 2..=50
    /// characters, otherwise any gateway or store failure.
    #[tracing::instrument(skip(self))]
    pub async fn translate(&self, id: TodoId, language: &str) -> Result<Translation, ClientError> {
        let language = language.trim();
        self.run(Operation::Translate, Some(BusyTarget::Todo(id)), async {
            validate_language(language)?;
            self.begin().await?;
            let translation = self.gateway.translate_todo(id, language).await?;
            self.reload().await?;
            tracing::info!(%id, language, "Todo translated");
            self.notify(Notice::success(format!("Translated to {language}!")));
            Ok(translation)
        })
        .await
    }

    /// Translates free text; the store is not touched
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for empty text or an invalid
    /// language, otherwise any gateway failure.
    #[tracing::instrument(skip(self, text))]
    pub async fn translate_text(
        &self,
        text: &str,
        language: &str,
    ) -> Result<TextTranslation, ClientError> {
        let language = language.trim();
        self.run(Operation::TranslateText, None, async {
            if text.trim().is_empty() {
                return Err(ValidationError::EmptyText.into());
            }
            validate_language(language)?;
            Ok(self.gateway.translate_text(text, language).await?)
        })
        .await
    }

    /// Updates a subtask, then reloads
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for an invalid title, otherwise any
    /// gateway or store failure.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_subtask(
        &self,
        id: SubtaskId,
        changes: SubtaskChanges,
    ) -> Result<Subtask, ClientError> {
        self.run(Operation::UpdateSubtask, Some(BusyTarget::Subtask(id)), async {
            changes.validate()?;
            self.begin().await?;
            let subtask = self.gateway.update_subtask(id, &changes).await?;
            self.reload().await?;
            Ok(subtask)
        })
        .await
    }

    /// Deletes a subtask, then reloads
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails; the store records the message.
    #[tracing::instrument(skip(self))]
    pub async fn delete_subtask(&self, id: SubtaskId) -> Result<(), ClientError> {
        self.run(Operation::DeleteSubtask, Some(BusyTarget::Subtask(id)), async {
            self.begin().await?;
            self.gateway.delete_subtask(id).await?;
            self.reload().await
        })
        .await
    }

    /// Re-fetches the complete subtask set of a todo and replaces the stored one
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails; the store records the message.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_subtasks(&self, id: TodoId) -> Result<Vec<Subtask>, ClientError> {
        self.run(Operation::RefreshSubtasks, Some(BusyTarget::Todo(id)), async {
            self.begin().await?;
            let subtasks = self.gateway.list_subtasks(id).await?;
            let action = TodoAction::AddSubtasks {
                todo_id: id,
                subtasks: subtasks.clone(),
            };
            self.apply_if_loaded(id, action).await?;
            Ok(subtasks)
        })
        .await
    }

    /// Re-fetches every translation of a todo and replaces the stored ones
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails; the store records the message.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_translations(&self, id: TodoId) -> Result<Vec<Translation>, ClientError> {
        self.run(Operation::RefreshTranslations, Some(BusyTarget::Todo(id)), async {
            self.begin().await?;
            let translations = self.gateway.list_translations(id).await?;
            let mut patch = TodoPatch::new(id);
            patch.translations = Some(translations.clone());
            self.apply_if_loaded(id, TodoAction::UpdateTodo(patch)).await?;
            Ok(translations)
        })
        .await
    }

    /// Focuses a todo for detail views, or clears the focus
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] after shutdown.
    pub async fn select(&self, todo: Option<Todo>) -> Result<(), ClientError> {
        Ok(self.store.send(TodoAction::SetSelected(todo)).await?)
    }

    /// Forgets the last failure message
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] after shutdown.
    pub async fn clear_error(&self) -> Result<(), ClientError> {
        Ok(self.store.send(TodoAction::ClearError).await?)
    }

    // Queries

    /// Copy of the whole state
    pub async fn snapshot(&self) -> TodoState {
        self.store.snapshot().await
    }

    /// Aggregate counts of the loaded collection
    pub async fn stats(&self) -> TodoStats {
        self.store.state(|s| s.stats).await
    }

    /// Loaded todos passing `filter`, in collection order
    pub async fn visible_todos(&self, filter: &TodoFilter) -> Vec<Todo> {
        self.store
            .state(|s| s.visible(filter).into_iter().cloned().collect())
            .await
    }

    /// A loaded todo by id
    pub async fn todo(&self, id: TodoId) -> Option<Todo> {
        self.store.state(|s| s.get(id).cloned()).await
    }

    /// Last failure message
    pub async fn error(&self) -> Option<String> {
        self.store.state(|s| s.error.clone()).await
    }

    /// Whether a whole-collection operation is in flight
    pub async fn is_loading(&self) -> bool {
        self.store.state(|s| s.loading).await
    }

    /// Whether `operation` is in flight on any target
    #[must_use]
    pub fn is_busy(&self, operation: Operation) -> bool {
        self.busy.is_busy(operation)
    }

    /// Whether `operation` is in flight on this target
    #[must_use]
    pub fn is_busy_for(&self, operation: Operation, target: Option<BusyTarget>) -> bool {
        self.busy.is_busy_for(operation, target)
    }

    /// Generation running for this todo, or the store is loading
    pub async fn is_generating(&self, id: TodoId) -> bool {
        self.is_busy_for(Operation::GenerateSubtasks, Some(BusyTarget::Todo(id)))
            || self.is_loading().await
    }

    /// A translation running for this todo, free text being translated, or
    /// the store is loading
    pub async fn is_translating(&self, id: TodoId) -> bool {
        self.is_busy_for(Operation::Translate, Some(BusyTarget::Todo(id)))
            || self.is_busy(Operation::TranslateText)
            || self.is_loading().await
    }

    /// Receives every notice published after the call
    #[must_use]
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Receives every transition applied after the call
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<TodoAction> {
        self.store.subscribe_actions()
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Stops applying responses
    ///
    /// Operations still in flight fail with [`ClientError::Store`] when their
    /// response arrives; the state they would have changed stays as it is.
    pub fn shutdown(&self) {
        tracing::info!(in_flight = self.busy.in_flight(), "Shutting down");
        self.store.shutdown();
    }

    // Plumbing

    async fn run<T, F>(
        &self,
        operation: Operation,
        target: Option<BusyTarget>,
        work: F,
    ) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let _busy = self.busy.acquire(operation, target);
        metrics::counter!("todo_ai.operations.total", "operation" => operation.as_str())
            .increment(1);

        match work.await {
            Ok(value) => Ok(value),
            Err(error) => {
                self.fail(operation, &error).await;
                Err(error)
            }
        }
    }

    async fn fail(&self, operation: Operation, error: &ClientError) {
        metrics::counter!("todo_ai.operations.failed", "operation" => operation.as_str())
            .increment(1);
        let message = error.user_message();
        if error.is_validation() {
            tracing::info!(operation = operation.as_str(), error = %message, "Input rejected");
        } else {
            tracing::warn!(operation = operation.as_str(), error = %message, "Operation failed");
        }

        if operation.records_error() {
            let recorded = self.store.send(TodoAction::SetError(message.clone())).await;
            if let Err(store_error) = recorded {
                tracing::debug!(error = %store_error, "Failure not recorded");
            }
        }

        let notice = operation
            .failure_notice()
            .map_or(message, ToString::to_string);
        self.notify(Notice::error(notice));
    }

    async fn begin(&self) -> Result<(), ClientError> {
        Ok(self.store.send(TodoAction::SetLoading(true)).await?)
    }

    async fn reload(&self) -> Result<(), ClientError> {
        let todos = self.gateway.list_todos(0, self.page_size).await?;
        Ok(self.store.send(TodoAction::SetTodos(todos)).await?)
    }

    /// Applies `action` only while `id` is still loaded or selected; returns
    /// whether it was
    async fn apply_if_loaded(&self, id: TodoId, action: TodoAction) -> Result<bool, ClientError> {
        if self.store.state(|s| s.contains(id) || s.is_selected(id)).await {
            self.store.send(action).await?;
            Ok(true)
        } else {
            tracing::debug!(
                %id,
                action = action.name(),
                "Skipped response for a todo no longer loaded"
            );
            self.store.send(TodoAction::SetLoading(false)).await?;
            Ok(false)
        }
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(%notice, "Notice");
        // No subscriber is fine
        let _ = self.notices.send(notice);
    }
}

impl std::fmt::Debug for TodoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoService")
            .field("busy", &self.busy)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayCall, GatewayError, MockGateway};
    use chrono::Utc;

    fn todo(id: i64, title: &str, completed: bool) -> Todo {
        Todo {
            id: TodoId::new(id),
            title: title.to_string(),
            description: None,
            completed,
            created_at: Utc::now(),
            updated_at: None,
            subtasks: Vec::new(),
            translations: Vec::new(),
        }
    }

    async fn loaded(gateway: &MockGateway) -> TodoService {
        let service = TodoService::new(Arc::new(gateway.clone()));
        assert!(service.load().await.is_ok());
        service
    }

    #[tokio::test]
    async fn load_replaces_collection() {
        let gateway = MockGateway::with_todos(vec![todo(1, "A", false), todo(2, "B", true)]);
        let service = loaded(&gateway).await;

        let state = service.snapshot().await;
        assert_eq!(state.todos.len(), 2);
        assert_eq!(state.stats.completed, 1);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn validation_failure_sends_nothing() {
        let gateway = MockGateway::new();
        let service = TodoService::new(Arc::new(gateway.clone()));

        let result = service.create(NewTodo::new("   ", None)).await;
        assert!(matches!(result, Err(ClientError::Validation(ValidationError::EmptyTitle))));
        assert!(gateway.calls().is_empty());
        assert_eq!(service.error().await.as_deref(), Some("Title is required"));
    }

    #[tokio::test]
    async fn stale_update_is_not_applied() {
        let gateway = MockGateway::with_todos(vec![todo(1, "A", false)]);
        // Empty store: the todo exists remotely but is not loaded
        let service = TodoService::new(Arc::new(gateway.clone()));

        let result = service
            .update(TodoId::new(1), TodoChanges::default().completed(true))
            .await;
        assert!(result.is_ok());

        let state = service.snapshot().await;
        assert!(state.todos.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn translate_text_leaves_store_error_alone() {
        let gateway = MockGateway::new();
        gateway.fail_on(
            GatewayCall::TranslateText,
            GatewayError::Server {
                status: 500,
                detail: "quota exceeded".to_string(),
            },
        );
        let service = TodoService::new(Arc::new(gateway));
        let mut notices = service.subscribe_notices();

        let result = service.translate_text("Hello", "French").await;
        assert!(result.is_err());
        assert_eq!(service.error().await, None);
        assert_eq!(notices.try_recv().ok(), Some(Notice::error("quota exceeded")));
    }
}
