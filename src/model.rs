use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::{Error, Result};

// Self documenting alias. Stored as local wall-clock time, second precision.
pub type TimeStamp = PrimitiveDateTime;

time::serde::format_description!(
    pub(crate) stamp_format,
    PrimitiveDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second]"
);

/// Current local time truncated to whole seconds.
///
/// Falls back to UTC when the local offset cannot be determined
/// (e.g. multi-threaded processes on some Unix platforms).
pub fn now() -> Result<TimeStamp> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let now = now.replace_nanosecond(0)?;
    Ok(PrimitiveDateTime::new(now.date(), now.time()))
}

// --- Task Status ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| Error::InvalidStatus(s.to_string()))
    }
}

// --- Task Priority ---

/// Free-text priority. The usual values are `low`, `medium` and `high`,
/// but anything is accepted and stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Priority(String);

impl Priority {
    pub const DEFAULT: &'static str = "medium";
    pub const STANDARD: [&'static str; 3] = ["low", "medium", "high"];

    /// Blank input becomes the default priority.
    pub fn new<S: Into<String>>(p: S) -> Self {
        let p = p.into();
        let trimmed = p.trim();
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(&self.0.as_str())
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

// --- Task Object ---
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    /** Immutable primary key (unique per task) */
    #[serde(rename = "ID")]
    pub id: u32,

    pub description: String,

    /** Workflow state */
    pub status: Status,

    /** Set once on creation */
    #[serde(with = "stamp_format")]
    pub created_at: TimeStamp,

    /** Refreshed on every mutation */
    #[serde(with = "stamp_format")]
    pub updated_at: TimeStamp,

    /** Unvalidated date text; written as "" when absent */
    #[serde(default, with = "due_date")]
    pub due_date: Option<String>,

    #[serde(default)]
    pub priority: Priority,
}

// --- Zero size markers for the "typed-state" builder ---
pub struct MissingDescription;
pub struct HasDescription;

// --- Generic Builder struct ---
pub struct TaskBuilder<DescState> {
    description: Option<String>,
    due_date: Option<String>,
    priority: Priority,

    // zero-cost phantom marker to record builder state in type system
    _state: std::marker::PhantomData<DescState>,
}

impl Task {
    /// Creates a new builder chain (*without* a description).
    pub fn builder() -> TaskBuilder<MissingDescription> {
        TaskBuilder {
            description: None,
            due_date: None,
            priority: Priority::default(),
            _state: std::marker::PhantomData,
        }
    }

    /// Replace the description & refresh `updated_at`.
    pub fn set_description<S: Into<String>>(&mut self, d: S, now: TimeStamp) {
        self.description = d.into();
        self.updated_at = now;
    }

    /// Move to `status`. Re-marking with the current status is rejected;
    /// any other transition (including backwards) is allowed.
    pub fn mark(&mut self, status: Status, now: TimeStamp) -> Result<()> {
        if self.status == status {
            return Err(Error::AlreadyMarked {
                id: self.id,
                status,
            });
        }
        self.status = status;
        self.updated_at = now;
        Ok(())
    }
}

impl TaskBuilder<MissingDescription> {
    pub fn description<S: Into<String>>(self, d: S) -> TaskBuilder<HasDescription> {
        TaskBuilder {
            description: Some(d.into()),
            due_date: self.due_date,
            priority: self.priority,
            _state: std::marker::PhantomData, // Flips to HasDescription marker
        }
    }
}

impl<DescState> TaskBuilder<DescState> {
    /// Optional due date; blank text means "none".
    pub fn due_date<S: Into<String>>(mut self, d: S) -> Self {
        self.due_date = normalize_due_date(d.into());
        self
    }

    pub fn priority<S: Into<String>>(mut self, p: S) -> Self {
        self.priority = Priority::new(p);
        self
    }
}

impl TaskBuilder<HasDescription> {
    /// Consume builder and return a fresh `todo` [`Task`].
    pub fn build(self, id: u32, now: TimeStamp) -> Task {
        Task {
            id,
            description: self.description.unwrap_or_default(),
            status: Status::Todo,
            created_at: now,
            updated_at: now,
            due_date: self.due_date,
            priority: self.priority,
        }
    }
}

fn normalize_due_date(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

mod due_date {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Option<String>, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(v.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.and_then(normalize_due_date))
    }
}

// --- Top level container ---

/// The ordered task collection as persisted: a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl<'de> Deserialize<'de> for TaskList {
    // `null` shows up in files where the last task was deleted.
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let tasks = Option::<Vec<Task>>::deserialize(d)?.unwrap_or_default();
        Ok(Self { tasks })
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last task's id + 1, or 1 for an empty list. Tasks are append-ordered,
    /// so holes left by deletes are never reused. `None` once the last id is
    /// `u32::MAX`.
    pub fn next_id(&self) -> Option<u32> {
        match self.tasks.last() {
            Some(t) => t.id.checked_add(1),
            None => Some(1),
        }
    }

    pub fn find_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Remove by id, keeping the order of the rest.
    pub fn remove(&mut self, id: u32) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl IntoIterator for TaskList {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn status_parses_exact_names_only() {
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!(" done ".parse::<Status>().unwrap(), Status::Done);
        assert!(matches!(
            "DONE".parse::<Status>(),
            Err(Error::InvalidStatus(_))
        ));
        assert!(matches!(
            "started".parse::<Status>(),
            Err(Error::InvalidStatus(_))
        ));
    }

    #[test]
    fn blank_priority_defaults_to_medium() {
        assert_eq!(Priority::new("").as_str(), "medium");
        assert_eq!(Priority::new("  ").as_str(), "medium");
        assert_eq!(Priority::new("urgent").as_str(), "urgent");
        assert!(!Priority::new("urgent").is_standard());
    }

    #[test]
    fn serializes_with_pascal_case_keys() {
        let at = datetime!(2025-01-01 09:30:00);
        let task = Task::builder().description("write report").build(2, at);
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"ID":2,"Description":"write report","Status":"todo","CreatedAt":"2025-01-01 09:30:00","UpdatedAt":"2025-01-01 09:30:00","DueDate":"","Priority":"medium"}"#
        );
    }

    #[test]
    fn null_document_is_an_empty_list() {
        let list: TaskList = serde_json::from_str("null").unwrap();
        assert!(list.is_empty());
        assert_eq!(list.next_id(), Some(1));
    }

    #[test]
    fn next_id_follows_last_task() {
        let at = datetime!(2025-01-01 09:30:00);
        let list = TaskList::from(vec![
            Task::builder().description("a").build(1, at),
            Task::builder().description("b").build(7, at),
        ]);
        assert_eq!(list.next_id(), Some(8));
    }

    #[test]
    fn next_id_is_none_after_max_id() {
        let at = datetime!(2025-01-01 09:30:00);
        let list = TaskList::from(vec![Task::builder().description("last").build(u32::MAX, at)]);
        assert_eq!(list.next_id(), None);
    }

    #[test]
    fn marking_same_status_is_rejected() {
        let at = datetime!(2025-01-01 09:30:00);
        let later = datetime!(2025-01-01 10:00:00);
        let mut task = Task::builder().description("a").build(1, at);

        assert!(matches!(
            task.mark(Status::Todo, later),
            Err(Error::AlreadyMarked { id: 1, status: Status::Todo })
        ));
        assert_eq!(task.updated_at, at);

        task.mark(Status::Done, later).unwrap();
        assert_eq!(task.updated_at, later);
        // backwards is fine
        task.mark(Status::Todo, later).unwrap();
    }
}
