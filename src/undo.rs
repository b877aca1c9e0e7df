//! One-level undo backed by the backup slot.
//!
//! Restoring copies the backup over the tasks file verbatim. The backup is
//! left in place, so undoing twice restores the same snapshot again rather
//! than toggling back.

use std::{fs, io::ErrorKind};

use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    storage::{Storage, atomic_write_bytes, open_or_init},
};

/// Restore the tasks file from the most recent backup.
pub fn undo_last_action(storage: &Storage) -> Result<()> {
    let backup = storage.backup_file();
    let snapshot = match fs::read(backup) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::NoBackup(backup.to_path_buf()));
        }
        Err(e) => return Err(Error::io(backup, e)),
    };
    debug!(path = %backup.display(), bytes = snapshot.len(), "read backup");

    // Make sure the target directory exists and nobody else holds the file.
    let file = open_or_init(storage.tasks_file())?;
    drop(file);

    atomic_write_bytes(storage.tasks_file(), &snapshot)?;
    info!(path = %storage.tasks_file().display(), "restored tasks from backup");
    Ok(())
}
