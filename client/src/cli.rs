//! Command-line definitions

use clap::{Parser, Subcommand};
use todo_ai::types::DEFAULT_MAX_SUBTASKS;
use todo_ai::{StatusFilter, SubtaskId, TodoId};

/// todo-ai - command-line client for the AI todo service
#[derive(Parser, Debug)]
#[command(
    name = "todo-ai",
    about = "Manage todos, generate subtasks and translate them with the AI todo service",
    version,
    after_help = "The service URL is read from TODO_AI_API_BASE_URL. Logs go to stderr; set RUST_LOG to change the level."
)]
pub struct Cli {
    /// Service base URL, overriding TODO_AI_API_BASE_URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Use a built-in in-memory service instead of the network
    #[arg(long, global = true)]
    pub offline: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List todos
    List {
        /// Show only all, completed or pending todos
        #[arg(short, long, default_value_t = StatusFilter::All)]
        status: StatusFilter,

        /// Case-insensitive text searched in titles and descriptions
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Show titles in this language when a translation exists
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Show one todo with its subtasks and translations
    Show {
        /// Todo id
        id: TodoId,

        /// Show the text in this language when a translation exists
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Create a todo
    Add {
        /// Title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Change fields of a todo
    Edit {
        /// Todo id
        id: TodoId,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New completion state
        #[arg(short, long)]
        completed: Option<bool>,
    },

    /// Flip completion of a todo
    Toggle {
        /// Todo id
        id: TodoId,
    },

    /// Delete a todo
    Rm {
        /// Todo id
        id: TodoId,
    },

    /// Generate subtasks for a todo
    Generate {
        /// Todo id
        id: TodoId,

        /// Maximum number of subtasks (1-10)
        #[arg(short, long, default_value_t = DEFAULT_MAX_SUBTASKS)]
        max: u8,
    },

    /// List the subtasks of a todo, fetched fresh from the service
    Subtasks {
        /// Todo id
        id: TodoId,
    },

    /// List the stored translations of a todo
    Translations {
        /// Todo id
        id: TodoId,
    },

    /// Mark a subtask done or not done
    Check {
        /// Subtask id
        id: SubtaskId,

        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },

    /// Delete a subtask
    RmSubtask {
        /// Subtask id
        id: SubtaskId,
    },

    /// Translate a todo
    Translate {
        /// Todo id
        id: TodoId,

        /// Target language, e.g. Spanish
        language: String,
    },

    /// Translate free text
    TranslateText {
        /// Target language, e.g. French
        language: String,

        /// Text to translate
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show completion statistics
    Stats,

    /// List preset target languages
    Languages,
}
