//! HTTP implementation of the gateway.

use super::{GatewayError, Result, TodoGateway};
use crate::config::ClientConfig;
use crate::types::{
    NewTodo, Subtask, SubtaskChanges, SubtaskId, TextTranslation, Todo, TodoChanges, TodoId,
    TodoPatch, Translation,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Serialize)]
struct GenerateRequest {
    todo_id: TodoId,
    max_subtasks: u8,
}

#[derive(Serialize)]
struct TranslateTodoRequest<'a> {
    target_language: &'a str,
}

#[derive(Serialize)]
struct TranslateTextRequest<'a> {
    text: &'a str,
    target_language: &'a str,
}

/// Gateway speaking JSON over HTTP to the todo service
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a gateway from client configuration
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Creates a gateway around an existing `reqwest` client
    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL every path is appended to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "Sending request");
        self.client.request(method, url)
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request did not complete");
            GatewayError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "Response received");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = GatewayError::from_response(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), error = %error, "Service returned an error");
        Err(error)
    }

    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        Self::send(request)
            .await?
            .json::<T>()
            .await
            .map_err(GatewayError::from)
    }
}

#[async_trait]
impl TodoGateway for HttpGateway {
    async fn list_todos(&self, skip: usize, limit: usize) -> Result<Vec<Todo>> {
        Self::fetch(
            self.request(Method::GET, "/todos")
                .query(&[("skip", skip), ("limit", limit)]),
        )
        .await
    }

    async fn get_todo(&self, id: TodoId) -> Result<Todo> {
        Self::fetch(self.request(Method::GET, &format!("/todos/{id}"))).await
    }

    async fn create_todo(&self, todo: &NewTodo) -> Result<Todo> {
        Self::fetch(self.request(Method::POST, "/todos").json(todo)).await
    }

    async fn update_todo(&self, id: TodoId, changes: &TodoChanges) -> Result<TodoPatch> {
        Self::fetch(self.request(Method::PUT, &format!("/todos/{id}")).json(changes)).await
    }

    async fn delete_todo(&self, id: TodoId) -> Result<()> {
        Self::send(self.request(Method::DELETE, &format!("/todos/{id}")))
            .await
            .map(drop)
    }

    async fn toggle_todo(&self, id: TodoId) -> Result<Todo> {
        Self::fetch(self.request(Method::PATCH, &format!("/todos/{id}/toggle"))).await
    }

    async fn generate_subtasks(&self, id: TodoId, max_subtasks: u8) -> Result<Vec<Subtask>> {
        let body = GenerateRequest {
            todo_id: id,
            max_subtasks,
        };
        Self::fetch(
            self.request(Method::POST, &format!("/todos/{id}/generate"))
                .json(&body),
        )
        .await
    }

    async fn translate_todo(&self, id: TodoId, target_language: &str) -> Result<Translation> {
        let body = TranslateTodoRequest { target_language };
        Self::fetch(
            self.request(Method::POST, &format!("/todos/{id}/translate"))
                .json(&body),
        )
        .await
    }

    async fn translate_text(&self, text: &str, target_language: &str) -> Result<TextTranslation> {
        let body = TranslateTextRequest {
            text,
            target_language,
        };
        Self::fetch(self.request(Method::POST, "/todos/translate").json(&body)).await
    }

    async fn list_subtasks(&self, id: TodoId) -> Result<Vec<Subtask>> {
        Self::fetch(self.request(Method::GET, &format!("/todos/{id}/subtasks"))).await
    }

    async fn list_translations(&self, id: TodoId) -> Result<Vec<Translation>> {
        Self::fetch(self.request(Method::GET, &format!("/todos/{id}/translations"))).await
    }

    async fn update_subtask(&self, id: SubtaskId, changes: &SubtaskChanges) -> Result<Subtask> {
        Self::fetch(self.request(Method::PUT, &format!("/subtasks/{id}")).json(changes)).await
    }

    async fn delete_subtask(&self, id: SubtaskId) -> Result<()> {
        Self::send(self.request(Method::DELETE, &format!("/subtasks/{id}")))
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let gateway = HttpGateway::with_client(Client::new(), "http://localhost:8000/api/v1/");
        assert_eq!(gateway.base_url(), "http://localhost:8000/api/v1");
    }

    #[test]
    fn request_bodies_match_service_shapes() {
        let generate = GenerateRequest {
            todo_id: TodoId::new(3),
            max_subtasks: 5,
        };
        assert_eq!(
            serde_json::to_value(&generate).unwrap_or_default(),
            serde_json::json!({ "todo_id": 3, "max_subtasks": 5 })
        );

        let translate = TranslateTextRequest {
            text: "Hello",
            target_language: "French",
        };
        assert_eq!(
            serde_json::to_value(&translate).unwrap_or_default(),
            serde_json::json!({ "text": "Hello", "target_language": "French" })
        );
    }
}
