//! In-memory gateway for tests and offline demos.
//!
//! [`MockGateway`] behaves like a small todo service: it assigns ids, stores
//! todos with their relations, generates predictable subtasks and fake
//! translations. Failures and latency can be injected per call kind.

use super::{GatewayError, Result, TodoGateway};
use crate::types::{
    NewTodo, Subtask, SubtaskChanges, SubtaskId, TextTranslation, Todo, TodoChanges, TodoId,
    TodoPatch, Translation, TranslationId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Kind of gateway call, for failure injection and call recording
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GatewayCall {
    /// `list_todos`
    ListTodos,
    /// `get_todo`
    GetTodo,
    /// `create_todo`
    CreateTodo,
    /// `update_todo`
    UpdateTodo,
    /// `delete_todo`
    DeleteTodo,
    /// `toggle_todo`
    ToggleTodo,
    /// `generate_subtasks`
    GenerateSubtasks,
    /// `translate_todo`
    TranslateTodo,
    /// `translate_text`
    TranslateText,
    /// `list_subtasks`
    ListSubtasks,
    /// `list_translations`
    ListTranslations,
    /// `update_subtask`
    UpdateSubtask,
    /// `delete_subtask`
    DeleteSubtask,
}

#[derive(Debug, Default)]
struct Inner {
    todos: Vec<Todo>,
    next_todo_id: i64,
    next_subtask_id: i64,
    next_translation_id: i64,
    failures: HashMap<GatewayCall, GatewayError>,
    calls: Vec<GatewayCall>,
    latency: Duration,
}

impl Inner {
    fn todo_mut(&mut self, id: TodoId) -> Result<&mut Todo> {
        self.todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Todo not found"))
    }

    fn subtask_mut(&mut self, id: SubtaskId) -> Result<&mut Subtask> {
        self.todos
            .iter_mut()
            .flat_map(|t| t.subtasks.iter_mut())
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Subtask not found"))
    }
}

fn not_found(detail: &str) -> GatewayError {
    GatewayError::Server {
        status: 404,
        detail: detail.to_string(),
    }
}

/// In-memory [`TodoGateway`]
///
/// Clones share the same backing data.
///
/// # Example
///
/// ```
/// use todo_ai::gateway::{GatewayCall, GatewayError, MockGateway, TodoGateway};
///
/// # async fn example() -> Result<(), GatewayError> {
/// let gateway = MockGateway::new();
/// gateway.fail_on(
///     GatewayCall::GenerateSubtasks,
///     GatewayError::Server { status: 500, detail: "model offline".into() },
/// );
///
/// let todos = gateway.list_todos(0, 100).await?;
/// assert!(todos.is_empty());
/// assert_eq!(gateway.calls(), vec![GatewayCall::ListTodos]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockGateway {
    inner: Arc<Mutex<Inner>>,
}

impl MockGateway {
    /// An empty service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A service already holding `todos`
    ///
    /// Later ids continue after the highest id present.
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let gateway = Self::new();
        {
            let mut inner = gateway.lock();
            inner.next_todo_id = todos.iter().map(|t| t.id.get()).max().unwrap_or(0);
            inner.next_subtask_id = todos
                .iter()
                .flat_map(|t| &t.subtasks)
                .map(|s| s.id.get())
                .max()
                .unwrap_or(0);
            inner.next_translation_id = todos
                .iter()
                .flat_map(|t| &t.translations)
                .map(|t| t.id.get())
                .max()
                .unwrap_or(0);
            inner.todos = todos;
        }
        gateway
    }

    /// Delays every call by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Makes every later call of this kind fail with `error`
    pub fn fail_on(&self, call: GatewayCall, error: GatewayError) {
        self.lock().failures.insert(call, error);
    }

    /// Removes every injected failure
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Calls received so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// How many calls of one kind were received
    #[must_use]
    pub fn call_count(&self, call: GatewayCall) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    /// Current server-side todos
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call, waits out the latency, then returns any injected failure
    async fn begin(&self, call: GatewayCall) -> Result<()> {
        let latency = {
            let mut inner = self.lock();
            inner.calls.push(call);
            inner.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match self.lock().failures.get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TodoGateway for MockGateway {
    async fn list_todos(&self, skip: usize, limit: usize) -> Result<Vec<Todo>> {
        self.begin(GatewayCall::ListTodos).await?;
        Ok(self.lock().todos.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn get_todo(&self, id: TodoId) -> Result<Todo> {
        self.begin(GatewayCall::GetTodo).await?;
        self.lock().todo_mut(id).map(|t| t.clone())
    }

    async fn create_todo(&self, todo: &NewTodo) -> Result<Todo> {
        self.begin(GatewayCall::CreateTodo).await?;
        let mut inner = self.lock();
        inner.next_todo_id += 1;
        let created = Todo {
            id: TodoId::new(inner.next_todo_id),
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: false,
            created_at: Utc::now(),
            updated_at: None,
            subtasks: Vec::new(),
            translations: Vec::new(),
        };
        inner.todos.push(created.clone());
        Ok(created)
    }

    async fn update_todo(&self, id: TodoId, changes: &TodoChanges) -> Result<TodoPatch> {
        self.begin(GatewayCall::UpdateTodo).await?;
        let mut inner = self.lock();
        let todo = inner.todo_mut(id)?;
        if let Some(title) = &changes.title {
            todo.title.clone_from(title);
        }
        if let Some(description) = &changes.description {
            todo.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(completed) = changes.completed {
            todo.completed = completed;
        }
        todo.updated_at = Some(Utc::now());

        // Scalar fields only; relations are left for the caller to keep
        let mut patch = TodoPatch::from(todo.clone());
        patch.subtasks = None;
        patch.translations = None;
        Ok(patch)
    }

    async fn delete_todo(&self, id: TodoId) -> Result<()> {
        self.begin(GatewayCall::DeleteTodo).await?;
        let mut inner = self.lock();
        let before = inner.todos.len();
        inner.todos.retain(|t| t.id != id);
        if inner.todos.len() == before {
            return Err(not_found("Todo not found"));
        }
        Ok(())
    }

    async fn toggle_todo(&self, id: TodoId) -> Result<Todo> {
        self.begin(GatewayCall::ToggleTodo).await?;
        let mut inner = self.lock();
        let todo = inner.todo_mut(id)?;
        todo.completed = !todo.completed;
        todo.updated_at = Some(Utc::now());
        Ok(todo.clone())
    }

    async fn generate_subtasks(&self, id: TodoId, max_subtasks: u8) -> Result<Vec<Subtask>> {
        self.begin(GatewayCall::GenerateSubtasks).await?;
        let mut inner = self.lock();
        let first_id = inner.next_subtask_id + 1;
        inner.next_subtask_id += i64::from(max_subtasks);

        let todo = inner.todo_mut(id)?;
        let subtasks: Vec<Subtask> = (0..max_subtasks)
            .map(|k| Subtask {
                id: SubtaskId::new(first_id + i64::from(k)),
                todo_id: Some(id),
                title: format!("Step {}: {}", u16::from(k) + 1, todo.title),
                description: None,
                completed: false,
                order_index: i32::from(k),
                created_at: Some(Utc::now()),
            })
            .collect();
        todo.subtasks.clone_from(&subtasks);
        Ok(subtasks)
    }

    async fn translate_todo(&self, id: TodoId, target_language: &str) -> Result<Translation> {
        self.begin(GatewayCall::TranslateTodo).await?;
        let mut inner = self.lock();
        inner.next_translation_id += 1;
        let translation_id = TranslationId::new(inner.next_translation_id);

        let todo = inner.todo_mut(id)?;
        let translation = Translation {
            id: translation_id,
            todo_id: Some(id),
            language: target_language.to_string(),
            translated_title: format!("[{target_language}] {}", todo.title),
            translated_description: todo
                .description
                .as_ref()
                .map(|d| format!("[{target_language}] {d}")),
            created_at: Utc::now(),
        };
        todo.translations.push(translation.clone());
        Ok(translation)
    }

    async fn translate_text(&self, text: &str, target_language: &str) -> Result<TextTranslation> {
        self.begin(GatewayCall::TranslateText).await?;
        Ok(TextTranslation {
            translated_text: format!("[{target_language}] {text}"),
            original_text: Some(text.to_string()),
            target_language: Some(target_language.to_string()),
        })
    }

    async fn list_subtasks(&self, id: TodoId) -> Result<Vec<Subtask>> {
        self.begin(GatewayCall::ListSubtasks).await?;
        self.lock().todo_mut(id).map(|t| t.subtasks.clone())
    }

    async fn list_translations(&self, id: TodoId) -> Result<Vec<Translation>> {
        self.begin(GatewayCall::ListTranslations).await?;
        self.lock().todo_mut(id).map(|t| t.translations.clone())
    }

    async fn update_subtask(&self, id: SubtaskId, changes: &SubtaskChanges) -> Result<Subtask> {
        self.begin(GatewayCall::UpdateSubtask).await?;
        let mut inner = self.lock();
        let subtask = inner.subtask_mut(id)?;
        if let Some(title) = &changes.title {
            subtask.title.clone_from(title);
        }
        if let Some(description) = &changes.description {
            subtask.description = Some(description.clone());
        }
        if let Some(completed) = changes.completed {
            subtask.completed = completed;
        }
        if let Some(order_index) = changes.order_index {
            subtask.order_index = order_index;
        }
        Ok(subtask.clone())
    }

    async fn delete_subtask(&self, id: SubtaskId) -> Result<()> {
        self.begin(GatewayCall::DeleteSubtask).await?;
        let mut inner = self.lock();
        let mut found = false;
        for todo in &mut inner.todos {
            let before = todo.subtasks.len();
            todo.subtasks.retain(|s| s.id != id);
            found |= todo.subtasks.len() != before;
        }
        if found {
            Ok(())
        } else {
            Err(not_found("Subtask not found"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let gateway = MockGateway::new();
        let first = gateway.create_todo(&NewTodo::new("A", None)).await;
        let second = gateway.create_todo(&NewTodo::new("B", None)).await;

        assert_eq!(first.map(|t| t.id), Ok(TodoId::new(1)));
        assert_eq!(second.map(|t| t.id), Ok(TodoId::new(2)));
        assert_eq!(gateway.todos().len(), 2);
    }

    #[tokio::test]
    async fn injected_failure_is_returned_until_cleared() {
        let gateway = MockGateway::new();
        let error = GatewayError::Transport("connection refused".to_string());
        gateway.fail_on(GatewayCall::ListTodos, error.clone());

        assert_eq!(gateway.list_todos(0, 10).await, Err(error));
        gateway.clear_failures();
        assert_eq!(gateway.list_todos(0, 10).await, Ok(Vec::new()));
        assert_eq!(gateway.call_count(GatewayCall::ListTodos), 2);
    }

    #[tokio::test]
    async fn generate_replaces_subtasks_in_order() {
        let gateway = MockGateway::new();
        let todo = gateway.create_todo(&NewTodo::new("Plan trip", None)).await;
        let id = todo.map(|t| t.id).unwrap_or(TodoId::new(0));

        let generated = gateway.generate_subtasks(id, 3).await.unwrap_or_default();
        assert_eq!(generated.len(), 3);
        assert_eq!(generated[0].title, "Step 1: Plan trip");
        assert_eq!(generated[2].order_index, 2);

        let again = gateway.generate_subtasks(id, 2).await.unwrap_or_default();
        let stored = gateway.get_todo(id).await.map(|t| t.subtasks);
        assert_eq!(stored, Ok(again));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let gateway = MockGateway::new();
        let missing = gateway.toggle_todo(TodoId::new(9)).await;
        assert!(matches!(missing, Err(ref e) if e.is_not_found()));

        let missing = gateway.delete_subtask(SubtaskId::new(9)).await;
        assert_eq!(missing, Err(not_found("Subtask not found")));
    }

    #[tokio::test]
    async fn relation_listings_follow_stored_todo() {
        let gateway = MockGateway::new();
        let id = gateway
            .create_todo(&NewTodo::new("Plan trip", None))
            .await
            .map(|t| t.id)
            .unwrap_or(TodoId::new(0));
        let generated = gateway.generate_subtasks(id, 2).await.unwrap_or_default();
        let _ = gateway.translate_todo(id, "German").await;

        assert_eq!(gateway.list_subtasks(id).await, Ok(generated));
        let translations = gateway.list_translations(id).await.unwrap_or_default();
        assert_eq!(translations.len(), 1);
        assert_eq!(translations[0].translated_title, "[German] Plan trip");

        let missing = gateway.list_subtasks(TodoId::new(99)).await;
        assert!(matches!(missing, Err(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn update_response_omits_relations() {
        let gateway = MockGateway::new();
        let id = gateway
            .create_todo(&NewTodo::new("A", None))
            .await
            .map(|t| t.id)
            .unwrap_or(TodoId::new(0));
        let _ = gateway.translate_todo(id, "French").await;

        let patch = gateway
            .update_todo(id, &TodoChanges::default().completed(true))
            .await;
        assert!(matches!(
            patch,
            Ok(ref p) if p.completed == Some(true) && p.translations.is_none()
        ));
        assert_eq!(gateway.todos()[0].translations.len(), 1);
    }
}
