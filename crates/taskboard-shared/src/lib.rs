use std::fmt;

use serde::{
  Deserialize,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(
  from = "Option<String>",
  into = "String"
)]
pub enum TaskStatus {
  #[default]
  Incomplete,
  InProgress,
  Completed,
  /// Value the backend sent that this
  /// client does not know. Kept so an
  /// update round-trips it unchanged.
  Other(String)
}

impl TaskStatus {
  pub fn as_str(&self) -> &str {
    match self {
      | TaskStatus::Incomplete => {
        "incomplete"
      }
      | TaskStatus::InProgress => {
        "in_progress"
      }
      | TaskStatus::Completed => {
        "completed"
      }
      | TaskStatus::Other(raw) => raw
    }
  }

  pub fn label(&self) -> &str {
    match self {
      | TaskStatus::Incomplete => {
        "Incomplete"
      }
      | TaskStatus::InProgress => {
        "In Progress"
      }
      | TaskStatus::Completed => {
        "Completed"
      }
      | TaskStatus::Other(raw) => raw
    }
  }

  /// The column a task with this status
  /// is drawn in. Anything unknown lands
  /// in `Incomplete`.
  pub fn column(&self) -> TaskStatus {
    match self {
      | TaskStatus::InProgress => {
        TaskStatus::InProgress
      }
      | TaskStatus::Completed => {
        TaskStatus::Completed
      }
      | _ => TaskStatus::Incomplete
    }
  }

  pub fn is_known(&self) -> bool {
    !matches!(self, TaskStatus::Other(_))
  }
}

impl From<&str> for TaskStatus {
  fn from(raw: &str) -> Self {
    match raw {
      | "incomplete" => {
        TaskStatus::Incomplete
      }
      | "in_progress" => {
        TaskStatus::InProgress
      }
      | "completed" => {
        TaskStatus::Completed
      }
      | other => {
        TaskStatus::Other(
          other.to_string()
        )
      }
    }
  }
}

impl From<Option<String>> for TaskStatus {
  fn from(raw: Option<String>) -> Self {
    raw
      .as_deref()
      .map(TaskStatus::from)
      .unwrap_or_default()
  }
}

impl From<TaskStatus> for String {
  fn from(status: TaskStatus) -> Self {
    match status {
      | TaskStatus::Other(raw) => raw,
      | known => {
        known.as_str().to_string()
      }
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(
  from = "Option<String>",
  into = "String"
)]
pub enum TaskPriority {
  Low,
  #[default]
  Medium,
  High,
  Other(String)
}

impl TaskPriority {
  pub fn as_str(&self) -> &str {
    match self {
      | TaskPriority::Low => "Low",
      | TaskPriority::Medium => "Medium",
      | TaskPriority::High => "High",
      | TaskPriority::Other(raw) => raw
    }
  }

  /// Ordering weight used by the
  /// priority sorts.
  pub fn rank(&self) -> u8 {
    match self {
      | TaskPriority::High => 3,
      | TaskPriority::Medium => 2,
      | TaskPriority::Low => 1,
      | TaskPriority::Other(_) => 0
    }
  }
}

impl From<&str> for TaskPriority {
  fn from(raw: &str) -> Self {
    match raw {
      | "Low" => TaskPriority::Low,
      | "Medium" => TaskPriority::Medium,
      | "High" => TaskPriority::High,
      | other => {
        TaskPriority::Other(
          other.to_string()
        )
      }
    }
  }
}

impl From<Option<String>>
  for TaskPriority
{
  fn from(raw: Option<String>) -> Self {
    raw
      .as_deref()
      .map(TaskPriority::from)
      .unwrap_or_default()
  }
}

impl From<TaskPriority> for String {
  fn from(priority: TaskPriority) -> Self {
    match priority {
      | TaskPriority::Other(raw) => raw,
      | known => {
        known.as_str().to_string()
      }
    }
  }
}

impl fmt::Display for TaskPriority {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct Task {
  #[serde(default)]
  pub id:          Option<u64>,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub priority:    TaskPriority,
  #[serde(default)]
  pub deadline:    Option<String>,
  #[serde(default)]
  pub status:      TaskStatus,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub created_at:  Option<String>
}

impl Task {
  pub fn description_or_empty(
    &self
  ) -> &str {
    self
      .description
      .as_deref()
      .unwrap_or_default()
  }
}

/// Body of `POST /api/tasks`.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskDraft {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub priority:    TaskPriority,
  #[serde(default)]
  pub deadline:    Option<String>
}

/// Body of `PUT /api/tasks/{id}`: full
/// replace of the editable fields.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskUpdate {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub priority:    TaskPriority,
  #[serde(default)]
  pub deadline:    Option<String>,
  #[serde(default)]
  pub status:      TaskStatus
}

/// Body of `PATCH
/// /api/tasks/{id}/status`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct StatusPatch {
  pub status: TaskStatus
}

/// Error payload the backend attaches to
/// 4xx responses.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub error: Option<String>
}
