use std::fs;

use tasker::{Error, Storage, TaskList};

mod support;

#[test]
fn load_creates_directory_and_empty_file() {
    let store = support::TestStore::new();
    assert!(!store.tasks_file().exists());

    let list = store.storage().load().expect("load");

    assert!(list.is_empty());
    assert_eq!(store.read_tasks_raw(), "[]");
    // loading is not a save
    assert!(!store.storage().backup_file().exists());
}

#[test]
fn save_then_load_round_trips() {
    let store = support::TestStore::new();
    tasker::add_task(store.storage(), "buy milk", "", "").expect("add");
    tasker::add_task(store.storage(), "write report", "2025-01-01", "high").expect("add");

    let before = store.storage().load().expect("load");
    store.storage().save(&before).expect("save");
    let after = store.storage().load().expect("reload");

    assert_eq!(before, after);
}

#[test]
fn save_backs_up_previous_contents() {
    let store = support::TestStore::new();
    tasker::add_task(store.storage(), "first", "", "").expect("add");
    let first = store.read_tasks_raw();

    tasker::add_task(store.storage(), "second", "", "").expect("add");

    assert_eq!(store.read_backup_raw(), first);
    assert_ne!(store.read_tasks_raw(), first);
}

#[test]
fn save_without_existing_file_skips_backup() {
    let store = support::TestStore::new();
    fs::create_dir_all(store.tasks_file().parent().unwrap()).unwrap();

    store.storage().save(&TaskList::new()).expect("save");

    assert!(!store.storage().backup_file().exists());
    assert_eq!(store.read_tasks_raw(), "[]");
}

#[test]
fn file_is_indented_with_one_space() {
    let store = support::TestStore::new();
    let task = tasker::add_task(store.storage(), "buy milk", "", "").expect("add");
    let stamp = task
        .created_at
        .format(time::macros::format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap();

    let expected = format!(
        "[\n {{\n  \"ID\": 1,\n  \"Description\": \"buy milk\",\n  \"Status\": \"todo\",\n  \"CreatedAt\": \"{stamp}\",\n  \"UpdatedAt\": \"{stamp}\",\n  \"DueDate\": \"\",\n  \"Priority\": \"medium\"\n }}\n]"
    );
    assert_eq!(store.read_tasks_raw(), expected);
}

#[test]
fn reads_files_written_by_older_versions() {
    let store = support::TestStore::new();
    store.write_tasks_raw(
        r#"[{"ID":3,"Description":"Ship it","Status":"in-progress","CreatedAt":"2024-05-01 10:00:00","UpdatedAt":"2024-05-02 11:30:15","DueDate":"2024-06-01","Priority":"urgent"}]"#,
    );

    let list = store.storage().load().expect("load");

    assert_eq!(list.len(), 1);
    let task = &list.tasks[0];
    assert_eq!(task.id, 3);
    assert_eq!(task.status, tasker::Status::InProgress);
    assert_eq!(task.due_date.as_deref(), Some("2024-06-01"));
    assert_eq!(task.priority.as_str(), "urgent");
    assert_eq!(list.next_id(), Some(4));
}

#[test]
fn null_document_loads_as_empty() {
    let store = support::TestStore::new();
    store.write_tasks_raw("null");

    assert!(store.storage().load().expect("load").is_empty());
}

#[test]
fn corrupt_file_is_a_parse_error() {
    let store = support::TestStore::new();
    store.write_tasks_raw("{ not json");

    let err = store.storage().load().unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "got {err:?}");
}

#[test]
fn invalid_utf8_is_a_parse_error() {
    let store = support::TestStore::new();
    let path = store.tasks_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"[\"\xff\xfe\"]").unwrap();

    let err = store.storage().load().unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "got {err:?}");
}

#[test]
fn backup_reports_whether_a_copy_was_made() {
    let store = support::TestStore::new();
    assert!(!store.storage().backup().expect("backup of missing file"));

    store.write_tasks_raw("[]");
    assert!(store.storage().backup().expect("backup"));
    assert_eq!(store.read_backup_raw(), "[]");
}

#[test]
fn failed_backup_leaves_tasks_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = dir.path().join("tasks.json");
    // A directory where the backup file should go makes the backup step fail.
    let backup = dir.path().join("blocked");
    fs::create_dir_all(backup.join("inner")).unwrap();
    let storage = Storage::with_backup(&tasks, &backup);

    fs::write(&tasks, "[]").unwrap();
    let err = tasker::add_task(&storage, "lost", "", "").unwrap_err();

    assert!(matches!(err, Error::Io { .. }), "got {err:?}");
    assert_eq!(fs::read_to_string(&tasks).unwrap(), "[]");
}
