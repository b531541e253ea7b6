//! Integration tests for the HTTP gateway
//!
//! A `wiremock` server stands in for the todo service; each test checks the
//! request the gateway sends and how it reads the response.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use todo_ai::{
    ClientConfig, ClientError, GatewayError, HttpGateway, NewTodo, SubtaskChanges, SubtaskId,
    TodoChanges, TodoGateway, TodoId, TodoService,
};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

async fn setup() -> (MockServer, HttpGateway) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(format!("{}/api/v1", server.uri()));
    let gateway = HttpGateway::new(&config).unwrap();
    (server, gateway)
}

fn todo_json(id: i64, title: &str, completed: bool) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "completed": completed,
        "created_at": "2025-01-01T10:00:00Z",
        "updated_at": null,
        "subtasks": [],
        "translations": []
    })
}

// ============================================================================
// Todos
// ============================================================================

#[tokio::test]
async fn list_sends_paging_parameters() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([todo_json(1, "A", false), todo_json(2, "B", true)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let todos = gateway.list_todos(0, 100).await.unwrap();

    assert_eq!(todos.len(), 2);
    assert_eq!(todos[1].id, TodoId::new(2));
    assert!(todos[1].completed);
}

#[tokio::test]
async fn list_reads_timestamps_without_offset() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "title": "Buy milk",
            "description": null,
            "completed": false,
            "created_at": "2025-01-01T10:00:00",
            "updated_at": null,
            "subtasks": [{
                "id": 4, "todo_id": 1, "title": "Find shop", "description": null,
                "completed": false, "order_index": 0, "created_at": "2025-01-01T10:05:00"
            }],
            "translations": [{
                "id": 2, "todo_id": 1, "language": "Spanish", "translated_title": "Comprar leche",
                "translated_description": null, "created_at": "2025-01-01T10:10:00.500000"
            }]
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let todos = gateway.list_todos(0, 100).await.unwrap();

    assert_eq!(todos[0].created_at.to_rfc3339(), "2025-01-01T10:00:00+00:00");
    assert_eq!(
        todos[0].subtasks[0].created_at.map(|t| t.to_rfc3339()).as_deref(),
        Some("2025-01-01T10:05:00+00:00")
    );
    assert_eq!(todos[0].translations[0].created_at.timestamp_subsec_millis(), 500);
}

#[tokio::test]
async fn service_loads_collection_with_naive_timestamps() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "title": "Buy milk",
            "description": null,
            "completed": true,
            "created_at": "2025-01-01T10:00:00",
            "updated_at": "2025-01-02T09:00:00",
            "subtasks": [],
            "translations": []
        }])))
        .mount(&server)
        .await;

    let service = TodoService::new(Arc::new(gateway));
    service.load().await.unwrap();

    let state = service.snapshot().await;
    assert_eq!(state.stats.completed, 1);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn create_posts_title_and_description() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/todos"))
        .and(body_json(json!({ "title": "Buy milk", "description": "Two litres" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "title": "Buy milk",
            "description": "Two litres",
            "completed": false,
            "created_at": "2025-01-01T10:00:00Z",
            "updated_at": null,
            "subtasks": [],
            "translations": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = gateway
        .create_todo(&NewTodo::new("Buy milk", Some("Two litres".to_string())))
        .await
        .unwrap();

    assert_eq!(created.id, TodoId::new(7));
    assert_eq!(created.description.as_deref(), Some("Two litres"));
}

#[tokio::test]
async fn create_without_description_omits_the_field() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/todos"))
        .and(body_json(json!({ "title": "Walk dog" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(todo_json(8, "Walk dog", false)))
        .expect(1)
        .mount(&server)
        .await;

    let created = gateway.create_todo(&NewTodo::new("Walk dog", None)).await;
    assert!(created.is_ok());
}

#[tokio::test]
async fn update_puts_only_changed_fields() {
    let (server, gateway) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/todos/3"))
        .and(body_json(json!({ "completed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "title": "A",
            "description": null,
            "completed": true,
            "created_at": "2025-01-01T10:00:00Z",
            "updated_at": "2025-01-02T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let patch = gateway
        .update_todo(TodoId::new(3), &TodoChanges::default().completed(true))
        .await
        .unwrap();

    assert_eq!(patch.completed, Some(true));
    assert_eq!(patch.description, Some(None));
    // Relations left out of the response stay absent in the patch
    assert_eq!(patch.subtasks, None);
    assert_eq!(patch.translations, None);
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let (server, gateway) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/todos/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(gateway.delete_todo(TodoId::new(4)).await, Ok(()));
}

#[tokio::test]
async fn toggle_patches_and_returns_record() {
    let (server, gateway) = setup().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/todos/5/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(todo_json(5, "A", true)))
        .expect(1)
        .mount(&server)
        .await;

    let todo = gateway.toggle_todo(TodoId::new(5)).await.unwrap();
    assert!(todo.completed);
}

// ============================================================================
// AI endpoints
// ============================================================================

#[tokio::test]
async fn generate_sends_todo_id_and_max() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/todos/2/generate"))
        .and(body_json(json!({ "todo_id": 2, "max_subtasks": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "todo_id": 2,
                "title": "Pick dates",
                "description": null,
                "completed": false,
                "order_index": 0,
                "created_at": "2025-01-01T10:00:00Z"
            },
            {
                "id": 2,
                "todo_id": 2,
                "title": "Book flights",
                "description": null,
                "completed": false,
                "order_index": 1,
                "created_at": "2025-01-01T10:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let subtasks = gateway.generate_subtasks(TodoId::new(2), 3).await.unwrap();

    assert_eq!(subtasks.len(), 2);
    assert_eq!(subtasks[1].title, "Book flights");
    assert_eq!(subtasks[1].order_index, 1);
}

#[tokio::test]
async fn translate_todo_sends_target_language() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/todos/1/translate"))
        .and(body_json(json!({ "target_language": "Spanish" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "todo_id": 1,
            "language": "Spanish",
            "translated_title": "Comprar leche",
            "translated_description": null,
            "created_at": "2025-01-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let translation = gateway.translate_todo(TodoId::new(1), "Spanish").await.unwrap();
    assert_eq!(translation.translated_title, "Comprar leche");
}

#[tokio::test]
async fn translate_text_sends_text_and_language() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/todos/translate"))
        .and(body_json(json!({ "text": "Good morning", "target_language": "French" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "original_text": "Good morning",
            "translated_text": "Bonjour",
            "target_language": "French"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let translated = gateway.translate_text("Good morning", "French").await.unwrap();
    assert_eq!(translated.translated_text, "Bonjour");
}

// ============================================================================
// Subtasks
// ============================================================================

#[tokio::test]
async fn subtasks_and_translations_are_listed_per_todo() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos/2/subtasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 5,
                "todo_id": 2,
                "title": "Pack",
                "description": null,
                "completed": true,
                "order_index": 1,
                "created_at": "2025-01-01T10:00:00"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos/2/translations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 3,
                "todo_id": 2,
                "language": "German",
                "translated_title": "Packen",
                "translated_description": null,
                "created_at": "2025-01-01T10:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let subtasks = gateway.list_subtasks(TodoId::new(2)).await.unwrap();
    let translations = gateway.list_translations(TodoId::new(2)).await.unwrap();

    assert_eq!(subtasks.len(), 1);
    assert_eq!(subtasks[0].order_index, 1);
    assert_eq!(translations[0].language, "German");
}

#[tokio::test]
async fn listing_relations_of_unknown_todo_is_not_found() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos/9/subtasks"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Todo not found" })),
        )
        .mount(&server)
        .await;

    let error = gateway.list_subtasks(TodoId::new(9)).await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn subtask_update_and_delete() {
    let (server, gateway) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/subtasks/12"))
        .and(body_json(json!({ "completed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12, "todo_id": 1, "title": "Pick dates", "description": null,
            "completed": true, "order_index": 0, "created_at": "2025-01-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/subtasks/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let updated = gateway
        .update_subtask(SubtaskId::new(12), &SubtaskChanges::completed(true))
        .await
        .unwrap();
    assert!(updated.completed);
    assert_eq!(gateway.delete_subtask(SubtaskId::new(12)).await, Ok(()));
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn server_detail_is_surfaced() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Todo not found" })),
        )
        .mount(&server)
        .await;

    let error = gateway.get_todo(TodoId::new(99)).await.unwrap_err();
    assert_eq!(
        error,
        GatewayError::Server {
            status: 404,
            detail: "Todo not found".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let error = gateway.get_todo(TodoId::new(1)).await.unwrap_err();
    assert!(matches!(error, GatewayError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let config = ClientConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
    let gateway = HttpGateway::new(&config).unwrap();

    let error = gateway.list_todos(0, 10).await.unwrap_err();
    assert!(matches!(error, GatewayError::Transport(_)));
}

#[tokio::test]
async fn service_records_server_detail_as_error() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([todo_json(1, "A", false)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/todos/1/generate"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "detail": "Failed to generate subtasks: model offline" })),
        )
        .mount(&server)
        .await;

    let service = TodoService::new(Arc::new(gateway));
    service.load().await.unwrap();
    let result = service.generate_subtasks(TodoId::new(1), 5).await;

    assert!(matches!(result, Err(ClientError::Gateway(ref e)) if e.status() == Some(500)));
    let state = service.snapshot().await;
    assert_eq!(
        state.error.as_deref(),
        Some("Failed to generate subtasks: model offline")
    );
    assert_eq!(state.todos.len(), 1);
}
