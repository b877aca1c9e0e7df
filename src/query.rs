//! Read-only views over the task list. Nothing here saves.

use crate::{
    error::Result,
    model::{Status, Task},
    storage::Storage,
};

/// All tasks when `status` is `None`, otherwise only those with that status.
/// Order is preserved.
pub fn filter_tasks(storage: &Storage, status: Option<Status>) -> Result<Vec<Task>> {
    let data = storage.load()?;
    Ok(match status {
        None => data.tasks,
        Some(s) => data.into_iter().filter(|t| t.status == s).collect(),
    })
}

/// Case-insensitive substring match on the description.
/// A blank keyword matches everything.
pub fn search_tasks(storage: &Storage, keyword: &str) -> Result<Vec<Task>> {
    // Lowercase the needle once, not per task.
    let needle = keyword.trim().to_lowercase();
    let data = storage.load()?;

    Ok(data
        .into_iter()
        .filter(|t| t.description.to_lowercase().contains(&needle))
        .collect())
}
