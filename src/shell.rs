//! Interactive prompt loop.
//!
//! Reads one command per line, prompts for its arguments, calls into the
//! library and prints the outcome. Errors are reported and the loop keeps
//! going; only `exit` or end of input stops it.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::{
    Status, Storage, add_task, delete_task, filter_tasks, mark_task, render::render_table,
    search_tasks, undo_last_action, update_task,
};

const COMMANDS: &str = "add, list, search, undo, update, delete, mark-in-progress, mark-done, help, exit";

pub fn run<R, W>(storage: &Storage, mut input: R, mut out: W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "Welcome to Task Tracker CLI!")?;
    writeln!(out, "Available commands: {COMMANDS}")?;

    loop {
        writeln!(out, "\nEnter a command.")?;
        let Some(command) = read_line(&mut input)? else {
            return Ok(());
        };
        debug!(%command, "shell command");

        let keep_going = match command.as_str() {
            "" => true,
            "exit" => {
                writeln!(out, "Goodbye!")?;
                false
            }
            "help" => {
                print_help(&mut out)?;
                true
            }
            "add" => cmd_add(storage, &mut input, &mut out)?,
            "list" => cmd_list(storage, &mut input, &mut out)?,
            "search" => cmd_search(storage, &mut input, &mut out)?,
            "update" => cmd_update(storage, &mut input, &mut out)?,
            "delete" => cmd_delete(storage, &mut input, &mut out)?,
            "mark-in-progress" => cmd_mark(storage, Status::InProgress, &mut input, &mut out)?,
            "mark-done" => cmd_mark(storage, Status::Done, &mut input, &mut out)?,
            "undo" => {
                match undo_last_action(storage) {
                    Ok(()) => writeln!(out, "Last action undone successfully!")?,
                    Err(e) => writeln!(out, "Error undoing last action: {e}")?,
                }
                true
            }
            _ => {
                writeln!(out, "Unknown command. Available commands: {COMMANDS}")?;
                true
            }
        };

        if !keep_going {
            return Ok(());
        }
    }
}

/// Next trimmed line, `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, msg: &str) -> io::Result<Option<String>> {
    writeln!(out, "{msg}")?;
    out.flush()?;
    read_line(input)
}

/// Prompt for a task id. `Ok(None)` means the command should be abandoned.
fn prompt_id<R: BufRead, W: Write>(input: &mut R, out: &mut W, msg: &str) -> io::Result<Option<u32>> {
    let Some(raw) = prompt(input, out, msg)? else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            writeln!(out, "Invalid Task ID!")?;
            Ok(None)
        }
    }
}

// Each cmd_* returns whether the loop should continue (false on end of input).

fn cmd_add<R: BufRead, W: Write>(storage: &Storage, input: &mut R, out: &mut W) -> io::Result<bool> {
    let Some(description) = prompt(input, out, "Enter task description")? else {
        return Ok(false);
    };
    let Some(due) = prompt(input, out, "Enter due date (YYYY-MM-DD) or press Enter to skip:")? else {
        return Ok(false);
    };
    let Some(priority) = prompt(
        input,
        out,
        "Enter priority (low, medium, high) or press Enter for default (medium):",
    )?
    else {
        return Ok(false);
    };

    match add_task(storage, &description, &due, &priority) {
        Ok(task) => writeln!(out, "Task added successfully! (ID: {})", task.id)?,
        Err(e) => writeln!(out, "Error adding task: {e}")?,
    }
    Ok(true)
}

fn cmd_list<R: BufRead, W: Write>(storage: &Storage, input: &mut R, out: &mut W) -> io::Result<bool> {
    let Some(raw) = prompt(
        input,
        out,
        "Enter task status to filter (todo, in-progress, done) or press Enter for all:",
    )?
    else {
        return Ok(false);
    };

    let status = if raw.is_empty() {
        None
    } else {
        match raw.parse::<Status>() {
            Ok(s) => Some(s),
            Err(e) => {
                writeln!(out, "{e}")?;
                return Ok(true);
            }
        }
    };

    match filter_tasks(storage, status) {
        Ok(tasks) if tasks.is_empty() => writeln!(out, "No tasks found matching this filter.")?,
        Ok(tasks) => render_table(&mut *out, &tasks)?,
        Err(e) => writeln!(out, "Error loading tasks: {e}")?,
    }
    Ok(true)
}

fn cmd_search<R: BufRead, W: Write>(storage: &Storage, input: &mut R, out: &mut W) -> io::Result<bool> {
    let Some(keyword) = prompt(input, out, "Enter a keyword to search")? else {
        return Ok(false);
    };

    match search_tasks(storage, &keyword) {
        Ok(tasks) if tasks.is_empty() => writeln!(out, "No tasks found matching this keyword.")?,
        Ok(tasks) => render_table(&mut *out, &tasks)?,
        Err(e) => writeln!(out, "Error loading tasks: {e}")?,
    }
    Ok(true)
}

fn cmd_update<R: BufRead, W: Write>(storage: &Storage, input: &mut R, out: &mut W) -> io::Result<bool> {
    let Some(id) = prompt_id(input, out, "Enter Task ID to update:")? else {
        return Ok(true);
    };
    let Some(description) = prompt(input, out, "Enter new description:")? else {
        return Ok(false);
    };

    match update_task(storage, id, &description) {
        Ok(_) => writeln!(out, "Task updated successfully!")?,
        Err(e) => writeln!(out, "Error updating task: {e}")?,
    }
    Ok(true)
}

fn cmd_delete<R: BufRead, W: Write>(storage: &Storage, input: &mut R, out: &mut W) -> io::Result<bool> {
    let Some(id) = prompt_id(input, out, "Enter Task ID to delete:")? else {
        return Ok(true);
    };

    match delete_task(storage, id) {
        Ok(_) => writeln!(out, "Task deleted successfully!")?,
        Err(e) => writeln!(out, "Error deleting task: {e}")?,
    }
    Ok(true)
}

fn cmd_mark<R: BufRead, W: Write>(
    storage: &Storage,
    status: Status,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    let Some(id) = prompt_id(input, out, "Enter Task ID:")? else {
        return Ok(true);
    };

    match mark_task(storage, id, status) {
        Ok(_) => writeln!(out, "Task marked as {status} successfully!")?,
        Err(e) => writeln!(out, "Error updating task status: {e}")?,
    }
    Ok(true)
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\nAvailable Commands:")?;
    writeln!(out, "  add              Add a new task")?;
    writeln!(out, "  list             Show tasks, optionally filtered by status")?;
    writeln!(out, "  search           Search tasks by keyword")?;
    writeln!(out, "  undo             Undo the last change")?;
    writeln!(out, "  update           Update a task description")?;
    writeln!(out, "  delete           Remove a task")?;
    writeln!(out, "  mark-in-progress Mark a task as 'in-progress'")?;
    writeln!(out, "  mark-done        Mark a task as 'done'")?;
    writeln!(out, "  exit             Exit the application")
}
