//! `todo-ai` command-line client.
//!
//! Loads the todo collection, runs one operation through [`TodoService`] and
//! prints the resulting view.

mod cli;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use todo_ai::gateway::MockGateway;
use todo_ai::types::COMMON_LANGUAGES;
use todo_ai::{
    ClientConfig, NewTodo, Notice, SubtaskChanges, SubtaskProgress, Todo, TodoChanges, TodoFilter,
    TodoId, TodoService, TodoStats,
};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if matches!(cli.command, Command::Languages) {
        for language in COMMON_LANGUAGES {
            println!("{language}");
        }
        return Ok(());
    }

    let service = connect(&cli)?;
    let mut notices = service.subscribe_notices();

    let result = run(&service, cli.command).await;

    print_notices(&mut notices);
    service.shutdown();
    result
}

fn connect(cli: &Cli) -> anyhow::Result<TodoService> {
    if cli.offline {
        tracing::info!("Using the in-memory service");
        return Ok(TodoService::new(Arc::new(MockGateway::with_todos(
            sample_todos(),
        ))));
    }

    let mut config = ClientConfig::from_env().context("Invalid environment configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url.as_str());
    }
    tracing::debug!(base_url = %config.base_url, "Connecting");

    TodoService::from_config(&config).context("Failed to set up the client")
}

async fn run(service: &TodoService, command: Command) -> anyhow::Result<()> {
    service.load().await.context("Failed to load todos")?;

    let mut filter = TodoFilter::default();
    let mut language = None;

    match command {
        Command::List {
            status,
            search,
            language: selected,
        } => {
            filter = TodoFilter::new(status, search);
            language = selected;
        }
        Command::Show { id, language } => {
            let todo = service.details(id).await?;
            print_details(&todo, language.as_deref());
            return Ok(());
        }
        Command::Add { title, description } => {
            let todo = service.create(NewTodo::new(title, description)).await?;
            println!("Created #{}", todo.id);
        }
        Command::Edit {
            id,
            title,
            description,
            completed,
        } => {
            let changes = TodoChanges {
                title: title.map(|t| t.trim().to_string()),
                description,
                completed,
            };
            if changes.is_empty() {
                anyhow::bail!("Nothing to change: pass --title, --description or --completed");
            }
            service.update(id, changes).await?;
        }
        Command::Toggle { id } => {
            service.toggle(id).await?;
        }
        Command::Rm { id } => {
            service.remove(id).await?;
        }
        Command::Generate { id, max } => {
            let subtasks = service.generate_subtasks(id, max).await?;
            for subtask in subtasks {
                println!("  - {}", subtask.title);
            }
        }
        Command::Subtasks { id } => {
            let mut subtasks = service.refresh_subtasks(id).await?;
            if subtasks.is_empty() {
                println!("No subtasks.");
            }
            subtasks.sort_by_key(|s| s.order_index);
            for subtask in subtasks {
                let mark = if subtask.completed { "✓" } else { " " };
                println!("  [{mark}] #{} {}", subtask.id, subtask.title);
            }
            return Ok(());
        }
        Command::Translations { id } => {
            let translations = service.refresh_translations(id).await?;
            if translations.is_empty() {
                println!("No translations.");
            }
            for translation in translations {
                println!("{}: {}", translation.language, translation.translated_title);
            }
            return Ok(());
        }
        Command::Check { id, undo } => {
            service
                .update_subtask(id, SubtaskChanges::completed(!undo))
                .await?;
        }
        Command::RmSubtask { id } => {
            service.delete_subtask(id).await?;
        }
        Command::Translate { id, language: target } => {
            let translation = service.translate(id, &target).await?;
            println!("{}: {}", translation.language, translation.translated_title);
            language = Some(translation.language);
        }
        Command::TranslateText { language, text } => {
            let translated = service.translate_text(&text.join(" "), &language).await?;
            println!("{}", translated.translated_text);
            return Ok(());
        }
        Command::Stats | Command::Languages => {}
    }

    print_list(&service.visible_todos(&filter).await, language.as_deref());
    print_stats(&service.stats().await);
    Ok(())
}

fn print_list(todos: &[Todo], language: Option<&str>) {
    if todos.is_empty() {
        println!("No todos.");
        return;
    }

    for todo in todos {
        let text = todo.localized(language);
        let mark = if todo.completed { "✓" } else { " " };
        let progress = SubtaskProgress::from_subtasks(&todo.subtasks);
        if progress.total > 0 {
            println!(
                "[{mark}] #{:<4} {} ({}/{} subtasks)",
                todo.id, text.title, progress.completed, progress.total
            );
        } else {
            println!("[{mark}] #{:<4} {}", todo.id, text.title);
        }
    }
}

fn print_details(todo: &Todo, language: Option<&str>) {
    let text = todo.localized(language);
    let status = if todo.completed { "completed" } else { "pending" };

    println!("#{} {} ({status})", todo.id, text.title);
    if let Some(description) = text.description {
        println!("  {description}");
    }
    println!("  created {}", todo.created_at.format("%Y-%m-%d %H:%M"));

    if !todo.subtasks.is_empty() {
        let progress = SubtaskProgress::from_subtasks(&todo.subtasks);
        println!("\nSubtasks ({}%):", progress.percentage());
        for subtask in todo.sorted_subtasks() {
            let mark = if subtask.completed { "✓" } else { " " };
            println!("  [{mark}] #{} {}", subtask.id, subtask.title);
        }
    }

    if !todo.translations.is_empty() {
        println!("\nTranslations:");
        for translation in &todo.translations {
            println!("  {}: {}", translation.language, translation.translated_title);
        }
    }
}

fn print_stats(stats: &TodoStats) {
    println!(
        "\nTotal: {}  Completed: {}  Pending: {}  ({}% done)",
        stats.total,
        stats.completed,
        stats.pending,
        stats.completion_rate()
    );
}

fn print_notices(notices: &mut broadcast::Receiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        eprintln!("{notice}");
    }
}

fn sample_todos() -> Vec<Todo> {
    let todo = |id: i64, title: &str, description: Option<&str>, completed: bool| Todo {
        id: TodoId::new(id),
        title: title.to_string(),
        description: description.map(str::to_string),
        completed,
        created_at: Utc::now(),
        updated_at: None,
        subtasks: Vec::new(),
        translations: Vec::new(),
    };

    vec![
        todo(1, "Buy milk", Some("Two litres, semi-skimmed"), false),
        todo(2, "Walk dog", Some("Around the park"), true),
        todo(3, "Plan trip to Lisbon", None, false),
    ]
}
