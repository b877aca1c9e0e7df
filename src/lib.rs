//! tasker - a small JSON-file task tracker.
//!
//! Every operation is a full load -> mutate -> save cycle against a
//! [`Storage`] handle. Saves keep one backup generation, which is what
//! [`undo_last_action`] restores.

pub mod error;
pub mod model;
pub mod query;
pub mod render;
pub mod shell;
pub mod storage;
pub mod undo;

use tracing::{info, warn};

pub use crate::{
    error::{Error, Result},
    model::{Priority, Status, Task, TaskList},
    query::{filter_tasks, search_tasks},
    storage::Storage,
    undo::undo_last_action,
};

/// Append a new `todo` task and return it.
///
/// A blank `priority` becomes `medium`; a blank `due_date` means no due date.
pub fn add_task(storage: &Storage, description: &str, due_date: &str, priority: &str) -> Result<Task> {
    // Open and lock storage file.
    let file = storage.open()?;
    let mut data: TaskList = storage::load_from(&file, storage.tasks_file())?;

    let id = data.next_id().ok_or(Error::IdExhausted)?;
    let task = Task::builder()
        .description(description)
        .due_date(due_date)
        .priority(priority)
        .build(id, model::now()?);

    if !task.priority.is_standard() {
        warn!(id = task.id, priority = %task.priority, "non-standard priority");
    }

    data.tasks.push(task.clone());

    // Release lock before the atomic replace.
    drop(file);
    storage.save(&data)?;
    info!(id = task.id, "task added");
    Ok(task)
}

/// Replace a task's description.
pub fn update_task(storage: &Storage, id: u32, description: &str) -> Result<Task> {
    let file = storage.open()?;
    let mut data: TaskList = storage::load_from(&file, storage.tasks_file())?;

    let now = model::now()?;
    let task = match data.find_mut(id) {
        Some(t) => {
            t.set_description(description, now);
            t.clone()
        }
        None => return Err(Error::TaskNotFound(id)),
    };

    drop(file);
    storage.save(&data)?;
    info!(id, "task updated");
    Ok(task)
}

/// Remove a task; the others keep their ids and order.
pub fn delete_task(storage: &Storage, id: u32) -> Result<Task> {
    let file = storage.open()?;
    let mut data: TaskList = storage::load_from(&file, storage.tasks_file())?;

    let removed = data.remove(id).ok_or(Error::TaskNotFound(id))?;

    drop(file);
    storage.save(&data)?;
    info!(id, "task deleted");
    Ok(removed)
}

/// Set a task's status. Fails with [`Error::AlreadyMarked`] if it already has it.
pub fn mark_task(storage: &Storage, id: u32, status: Status) -> Result<Task> {
    let file = storage.open()?;
    let mut data: TaskList = storage::load_from(&file, storage.tasks_file())?;

    let now = model::now()?;
    let task = data.find_mut(id).ok_or(Error::TaskNotFound(id))?;
    task.mark(status, now)?;
    let task = task.clone();

    drop(file);
    storage.save(&data)?;
    info!(id, %status, "task marked");
    Ok(task)
}
