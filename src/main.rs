use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use tasker::{Status, Storage, render::render_table, storage::DEFAULT_TASKS_FILE};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(author, version, about = "Track tasks in a JSON file")]
struct Cli {
    /// Main verb. If omitted, `list` is default action.
    #[command(subcommand)]
    verb: Option<Verb>,

    /// Task file to read and write.
    #[arg(short, long, global = true, env = "TASKER_FILE", value_hint = ValueHint::FilePath, default_value = DEFAULT_TASKS_FILE)]
    file: PathBuf,

    /// Backup slot used by `undo` (defaults to `<stem>_backup.json` beside the task file).
    #[arg(long, global = true, env = "TASKER_BACKUP", value_hint = ValueHint::FilePath)]
    backup: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Verb {
    /// Add a new task.
    Add {
        description: String,

        /// Due date text, e.g. 2025-01-01.
        #[arg(short, long, default_value = "")]
        due: String,

        /// low, medium or high (anything else is kept as typed).
        #[arg(short, long, default_value = "")]
        priority: String,
    },
    /// Show tasks, optionally only those with STATUS.
    List { status: Option<Status> },
    /// Case-insensitive search in descriptions.
    Search { keyword: String },
    /// Replace a task's description.
    Update { id: u32, description: String },
    /// Remove a task.
    Delete { id: u32 },
    /// Set a task's status (todo, in-progress, done).
    Mark { id: u32, status: Status },
    /// Mark a task as 'in-progress'.
    MarkInProgress { id: u32 },
    /// Mark a task as 'done'.
    MarkDone { id: u32 },
    /// Restore the task file from the last backup.
    Undo,
    /// Interactive prompt.
    Shell,
}

fn main() -> Result<()> {
    // Tracing is opt-in via RUST_LOG and goes to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let storage = match cli.backup {
        Some(backup) => Storage::with_backup(&cli.file, backup),
        None => Storage::new(&cli.file),
    };

    match cli.verb.unwrap_or(Verb::List { status: None }) {
        Verb::Add {
            description,
            due,
            priority,
        } => {
            let task = tasker::add_task(&storage, &description, &due, &priority)
                .context("adding task")?;
            println!("Task added successfully! (ID: {})", task.id);
        }
        Verb::List { status } => {
            let tasks = tasker::filter_tasks(&storage, status).context("loading tasks")?;
            if tasks.is_empty() {
                println!("No tasks found matching this filter.");
            } else {
                render_table(io::stdout().lock(), &tasks)?;
            }
        }
        Verb::Search { keyword } => {
            let tasks = tasker::search_tasks(&storage, &keyword).context("loading tasks")?;
            if tasks.is_empty() {
                println!("No tasks found matching this keyword.");
            } else {
                render_table(io::stdout().lock(), &tasks)?;
            }
        }
        Verb::Update { id, description } => {
            tasker::update_task(&storage, id, &description).context("updating task")?;
            println!("Task updated successfully!");
        }
        Verb::Delete { id } => {
            tasker::delete_task(&storage, id).context("deleting task")?;
            println!("Task deleted successfully!");
        }
        Verb::Mark { id, status } => mark(&storage, id, status)?,
        Verb::MarkInProgress { id } => mark(&storage, id, Status::InProgress)?,
        Verb::MarkDone { id } => mark(&storage, id, Status::Done)?,
        Verb::Undo => {
            tasker::undo_last_action(&storage).context("undoing last action")?;
            println!("Last action undone successfully!");
        }
        Verb::Shell => tasker::shell::run(&storage, io::stdin().lock(), io::stdout().lock())?,
    }
    Ok(())
}

fn mark(storage: &Storage, id: u32, status: Status) -> Result<()> {
    tasker::mark_task(storage, id, status).context("updating task status")?;
    println!("Task marked as {status} successfully!");
    Ok(())
}
