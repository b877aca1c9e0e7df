//! Error types for the task store.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Status;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt task file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not encode tasks: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("task ids exhausted, the last task already has id {}", u32::MAX)]
    IdExhausted,

    #[error("task {0} not found, use 'list' to check available tasks")]
    TaskNotFound(u32),

    #[error("task {id} is already marked as '{status}'")]
    AlreadyMarked { id: u32, status: Status },

    #[error("no backup found at {}, cannot undo last action", .0.display())]
    NoBackup(PathBuf),

    #[error("invalid status '{0}' (expected todo, in-progress or done)")]
    InvalidStatus(String),

    #[error("could not read the clock: {0}")]
    Clock(#[from] time::error::ComponentRange),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "nothing to act on" family: unknown id or missing backup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TaskNotFound(_) | Error::NoBackup(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
