// --- Atomic JSON persistence with a single-slot backup ---

use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use fs4::fs_std::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile; // For atomic writes
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::TaskList,
};

/// Where the task list lives unless told otherwise.
pub const DEFAULT_TASKS_FILE: &str = "task/tasks.json";

/// Handle to the on-disk task list and its backup slot.
///
/// Every operation reloads from disk; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Storage {
    tasks_file: PathBuf,
    backup_file: PathBuf,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new(DEFAULT_TASKS_FILE)
    }
}

impl Storage {
    /// Backup path is derived as `<stem>_backup.json` beside the tasks file.
    pub fn new(tasks_file: impl Into<PathBuf>) -> Self {
        let tasks_file = tasks_file.into();
        let backup_file = backup_path_for(&tasks_file);
        Self {
            tasks_file,
            backup_file,
        }
    }

    pub fn with_backup(tasks_file: impl Into<PathBuf>, backup_file: impl Into<PathBuf>) -> Self {
        Self {
            tasks_file: tasks_file.into(),
            backup_file: backup_file.into(),
        }
    }

    pub fn tasks_file(&self) -> &Path {
        &self.tasks_file
    }

    pub fn backup_file(&self) -> &Path {
        &self.backup_file
    }

    /// Open the tasks file under an exclusive lock, creating it (and its
    /// directory) seeded with `[]` when missing. The lock lasts until the
    /// returned handle is dropped.
    pub fn open(&self) -> Result<File> {
        open_or_init(&self.tasks_file)
    }

    /// Read the whole collection.
    pub fn load(&self) -> Result<TaskList> {
        let file = self.open()?;
        load_from(&file, &self.tasks_file)
    }

    /// Back up the current file, then atomically replace it with `tasks`.
    ///
    /// If the backup step fails the tasks file is left untouched.
    pub fn save(&self, tasks: &TaskList) -> Result<()> {
        let payload = to_pretty_json(tasks)?;
        let backed_up = self.backup()?;
        atomic_write_bytes(&self.tasks_file, &payload)?;
        debug!(path = %self.tasks_file.display(), count = tasks.len(), backed_up, "saved tasks");
        Ok(())
    }

    /// Copy the current on-disk tasks file into the backup slot.
    /// Returns `false` when there is no tasks file yet.
    pub fn backup(&self) -> Result<bool> {
        let current = match fs::read(&self.tasks_file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.tasks_file.display(), "nothing to back up");
                return Ok(false);
            }
            Err(e) => return Err(Error::io(&self.tasks_file, e)),
        };

        ensure_parent(&self.backup_file)?;
        atomic_write_bytes(&self.backup_file, &current)?;
        debug!(path = %self.backup_file.display(), "backup written");
        Ok(true)
    }
}

/// `task/tasks.json` -> `task/tasks_backup.json`
pub fn backup_path_for(tasks_file: &Path) -> PathBuf {
    let stem = tasks_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tasks".to_string());
    let name = match tasks_file.extension() {
        Some(ext) => format!("{stem}_backup.{}", ext.to_string_lossy()),
        None => format!("{stem}_backup"),
    };
    tasks_file.with_file_name(name)
}

/// Open storage file with an exclusive lock (read/write),
/// auto-creating and seeding if missing.
pub fn open_or_init(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();

    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => {
            lock_file(&file, path)?;
            Ok(file)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            ensure_parent(path)?;
            let mut file = OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true) // fail if raced
                .open(path)
                .map_err(|e| Error::io(path, e))?;

            // Seed file with valid JSON.
            file.write_all(b"[]")
                .and_then(|()| file.flush())
                .map_err(|e| Error::io(path, e))?;
            debug!(path = %path.display(), "created empty task file");

            lock_file(&file, path)?;
            Ok(file)
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Read JSON from an already-opened & locked file into any deserializable type.
pub fn load_from<R, T>(mut file: R, path: &Path) -> Result<T>
where
    R: Read + Seek,
    T: DeserializeOwned,
{
    // Rewind since caller may have written.
    let mut raw = Vec::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut raw))
        .map_err(|e| Error::io(path, e))?;

    // Bad UTF-8 is malformed content too, so leave byte decoding to serde_json.
    Ok(serde_json::from_slice(&raw)?)
}

/// Replace `path` with `bytes` only once the entire payload is safely on disk.
pub(crate) fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    // Write into a temp file in the *same* directory so the rename stays on one filesystem.
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.flush())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

/// Pretty JSON with one-space indentation, the layout existing task files use.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b" "));
    value.serialize(&mut ser).map_err(Error::Encode)?;
    Ok(out)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

// --- Internal Helper: advisory locking ---
fn lock_file(file: &File, path: &Path) -> Result<()> {
    FileExt::lock_exclusive(file).map_err(|e| Error::io(path, e))
}
