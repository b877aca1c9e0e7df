#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tasker::Storage;
use tempfile::TempDir;

/// A task store rooted in its own temp directory.
pub struct TestStore {
    dir: TempDir,
    storage: Storage,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let storage = Storage::new(dir.path().join("task").join("tasks.json"));
        Self { dir, storage }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.storage.tasks_file().to_path_buf()
    }

    pub fn read_tasks_raw(&self) -> String {
        fs::read_to_string(self.storage.tasks_file()).expect("read tasks file")
    }

    pub fn read_backup_raw(&self) -> String {
        fs::read_to_string(self.storage.backup_file()).expect("read backup file")
    }

    pub fn write_tasks_raw(&self, contents: &str) {
        let path = self.storage.tasks_file();
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write tasks file");
    }

    pub fn ids(&self) -> Vec<u32> {
        tasker::filter_tasks(&self.storage, None)
            .expect("load")
            .iter()
            .map(|t| t.id)
            .collect()
    }
}
