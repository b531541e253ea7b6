//! # Todo AI Client
//!
//! Client-side state container for the AI todo service.
//!
//! The remote service stores todos and does the AI work (subtask generation,
//! translation). This crate keeps an in-memory copy of the todo list consistent
//! with it and derives what a user interface shows.
//!
//! ## Layers
//!
//! - [`stats`]: Aggregates `{total, completed, pending}` from a todo list
//! - [`reducer`]: The state store's named transitions ([`TodoAction`])
//! - [`gateway`]: The remote HTTP API behind the [`TodoGateway`] trait
//! - [`filter`]: Status and search filtering for list views
//! - [`service`]: Orchestration of gateway calls and store transitions
//!
//! ## Example
//!
//! ```no_run
//! use todo_ai::{ClientConfig, NewTodo, StatusFilter, TodoFilter, TodoService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let service = TodoService::from_config(&config)?;
//!
//! service.load().await?;
//! service.create(NewTodo::new("Buy milk", None)).await?;
//!
//! let filter = TodoFilter::new(StatusFilter::Pending, "milk");
//! for todo in service.visible_todos(&filter).await {
//!     println!("{}", todo.title);
//! }
//! println!("{:?}", service.stats().await);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod reducer;
pub mod service;
pub mod state;
pub mod stats;
pub mod timestamp;
pub mod types;

// Re-export commonly used types
pub use actions::TodoAction;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ValidationError};
pub use filter::{FilterUpdate, StatusFilter, TodoFilter, filter_todos};
pub use gateway::{GatewayError, HttpGateway, TodoGateway};
pub use reducer::{TodoReducer, TodoStore};
pub use service::{BusyTarget, Notice, NoticeLevel, Operation, TodoService};
pub use state::TodoState;
pub use stats::{SubtaskProgress, TodoStats, compute_stats};
pub use types::{
    LocalizedText, NewTodo, Subtask, SubtaskChanges, SubtaskId, TextTranslation, Todo,
    TodoChanges, TodoId, TodoPatch, Translation, TranslationId,
};
