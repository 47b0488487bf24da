use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// Some stores hand out numeric ids, others strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        TaskId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => TaskId(s),
            RawId::Number(n) => TaskId(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    ToDo,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::ToDo, Status::InProgress, Status::Completed];

    /// Reads the two wire booleans. `completed` wins over `isProcessing`.
    pub fn from_flags(completed: bool, is_processing: bool) -> Self {
        match (completed, is_processing) {
            (true, _) => Status::Completed,
            (false, true) => Status::InProgress,
            (false, false) => Status::ToDo,
        }
    }

    /// `(completed, isProcessing)`
    pub fn to_flags(self) -> (bool, bool) {
        match self {
            Status::ToDo => (false, false),
            Status::InProgress => (false, true),
            Status::Completed => (true, false),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn is_completed(self) -> bool {
        self == Status::Completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: Status,
    // mirrors the stored isProcessing flag, which survives completion
    pub processing: bool,
    pub position: usize,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.processing = status.to_flags().1;
    }

    /// Flips `completed` alone. Un-completing returns the task to In Progress
    /// if it was being worked on when it was completed.
    pub fn toggle_completed(&mut self) -> bool {
        let completed = !self.status.is_completed();
        self.status = Status::from_flags(completed, self.processing);
        completed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_processing: bool,
    #[serde(default)]
    pub position: usize,
    #[serde(default, deserialize_with = "nullable_timestamp")]
    pub created_at: DateTime<Utc>,
}

fn nullable_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Task {
            id: record.id,
            name: record.name,
            status: Status::from_flags(record.completed, record.is_processing),
            processing: record.is_processing,
            position: record.position,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub position: usize,
    pub is_processing: bool,
}

impl NewTask {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        NewTask {
            name: name.into(),
            completed: false,
            created_at: Utc::now(),
            position,
            is_processing: false,
        }
    }
}

/// Partial update; absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_processing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl TaskPatch {
    pub fn position(position: usize) -> Self {
        TaskPatch {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        TaskPatch {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        TaskPatch {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        let (completed, is_processing) = status.to_flags();
        self.completed = Some(completed);
        self.is_processing = Some(is_processing);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTab {
    List,
    Kanban,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupMode {
    None,
    AddTask,
    EditName(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

// a new notice replaces the old one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            level: NoticeLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }
}
