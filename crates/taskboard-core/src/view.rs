use std::cmp::Ordering;
use std::fmt;

use chrono::{
  DateTime,
  Utc
};
use taskboard_shared::{
  Task,
  TaskStatus
};
use tracing::debug;

use crate::format::deadline_instant;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub enum SortKey {
  #[default]
  CreatedDesc,
  CreatedAsc,
  DeadlineAsc,
  DeadlineDesc,
  PriorityDesc,
  PriorityAsc,
  TitleAsc,
  TitleDesc,
  /// Keep the collection's own order.
  Unordered
}

impl SortKey {
  pub const ALL: [SortKey; 8] = [
    SortKey::CreatedDesc,
    SortKey::CreatedAsc,
    SortKey::DeadlineAsc,
    SortKey::DeadlineDesc,
    SortKey::PriorityDesc,
    SortKey::PriorityAsc,
    SortKey::TitleAsc,
    SortKey::TitleDesc
  ];

  pub fn parse(raw: &str) -> Self {
    let key = Self::ALL
      .into_iter()
      .find(|key| key.as_str() == raw.trim())
      .unwrap_or(SortKey::Unordered);
    if key == SortKey::Unordered {
      debug!(raw, "unrecognized sort key; keeping collection order");
    }
    key
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | SortKey::CreatedDesc => {
        "created_desc"
      }
      | SortKey::CreatedAsc => {
        "created_asc"
      }
      | SortKey::DeadlineAsc => {
        "deadline_asc"
      }
      | SortKey::DeadlineDesc => {
        "deadline_desc"
      }
      | SortKey::PriorityDesc => {
        "priority_desc"
      }
      | SortKey::PriorityAsc => {
        "priority_asc"
      }
      | SortKey::TitleAsc => "title_asc",
      | SortKey::TitleDesc => {
        "title_desc"
      }
      | SortKey::Unordered => "unordered"
    }
  }
}

impl fmt::Display for SortKey {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Search text and sort key currently
/// applied to the board.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct ViewQuery {
  pub search: String,
  pub sort:   SortKey
}

impl ViewQuery {
  pub fn new(
    search: impl Into<String>,
    sort: SortKey
  ) -> Self {
    Self {
      search: search.into(),
      sort
    }
  }
}

#[derive(
  Debug, Clone, Default, PartialEq,
)]
pub struct BoardView {
  pub incomplete:  Vec<Task>,
  pub in_progress: Vec<Task>,
  pub completed:   Vec<Task>
}

impl BoardView {
  pub fn column(
    &self,
    status: &TaskStatus
  ) -> &[Task] {
    match status.column() {
      | TaskStatus::InProgress => {
        &self.in_progress
      }
      | TaskStatus::Completed => {
        &self.completed
      }
      | _ => &self.incomplete
    }
  }

  /// Columns in display order.
  pub fn columns(
    &self
  ) -> [(TaskStatus, &[Task]); 3] {
    [
      (
        TaskStatus::Incomplete,
        self.incomplete.as_slice()
      ),
      (
        TaskStatus::InProgress,
        self.in_progress.as_slice()
      ),
      (
        TaskStatus::Completed,
        self.completed.as_slice()
      )
    ]
  }

  pub fn total(&self) -> usize {
    self.incomplete.len()
      + self.in_progress.len()
      + self.completed.len()
  }

  pub fn is_empty(&self) -> bool {
    self.total() == 0
  }
}

/// Filters `tasks` by `search`, orders
/// the survivors by `sort` and splits
/// them into the three status columns.
/// Pure: equal inputs give equal output.
#[must_use]
pub fn project(
  tasks: &[Task],
  search: &str,
  sort: SortKey
) -> BoardView {
  let needle =
    search.trim().to_lowercase();

  let mut visible: Vec<&Task> = tasks
    .iter()
    .filter(|task| {
      matches_search(task, &needle)
    })
    .collect();

  if sort != SortKey::Unordered {
    // slice::sort_by is stable, so ties
    // keep collection order.
    visible.sort_by(|a, b| {
      compare_tasks(a, b, sort)
    });
  }

  let mut view = BoardView::default();
  for task in visible {
    let bucket = match task.status.column()
    {
      | TaskStatus::InProgress => {
        &mut view.in_progress
      }
      | TaskStatus::Completed => {
        &mut view.completed
      }
      | _ => &mut view.incomplete
    };
    bucket.push(task.clone());
  }

  view
}

fn matches_search(
  task: &Task,
  needle: &str
) -> bool {
  if needle.is_empty() {
    return true;
  }

  let title_match = task
    .title
    .to_lowercase()
    .contains(needle);
  let description_match = task
    .description
    .as_deref()
    .is_some_and(|description| {
      description
        .to_lowercase()
        .contains(needle)
    });

  title_match || description_match
}

fn compare_tasks(
  a: &Task,
  b: &Task,
  sort: SortKey
) -> Ordering {
  match sort {
    | SortKey::CreatedDesc => {
      created_key(b).cmp(&created_key(a))
    }
    | SortKey::CreatedAsc => {
      created_key(a).cmp(&created_key(b))
    }
    | SortKey::DeadlineAsc => {
      compare_deadlines(
        deadline_key(a),
        deadline_key(b),
        false
      )
    }
    | SortKey::DeadlineDesc => {
      compare_deadlines(
        deadline_key(a),
        deadline_key(b),
        true
      )
    }
    | SortKey::PriorityDesc => {
      b.priority
        .rank()
        .cmp(&a.priority.rank())
    }
    | SortKey::PriorityAsc => {
      a.priority
        .rank()
        .cmp(&b.priority.rank())
    }
    | SortKey::TitleAsc => {
      compare_titles(&a.title, &b.title)
    }
    | SortKey::TitleDesc => {
      compare_titles(&b.title, &a.title)
    }
    | SortKey::Unordered => {
      Ordering::Equal
    }
  }
}

fn created_key(task: &Task) -> u64 {
  task.id.unwrap_or(0)
}

fn deadline_key(
  task: &Task
) -> Option<DateTime<Utc>> {
  task
    .deadline
    .as_deref()
    .and_then(deadline_instant)
}

/// Tasks without a deadline go last in
/// both directions.
fn compare_deadlines(
  a: Option<DateTime<Utc>>,
  b: Option<DateTime<Utc>>,
  descending: bool
) -> Ordering {
  match (a, b) {
    | (Some(a), Some(b)) => {
      if descending {
        b.cmp(&a)
      } else {
        a.cmp(&b)
      }
    }
    | (Some(_), None) => Ordering::Less,
    | (None, Some(_)) => {
      Ordering::Greater
    }
    | (None, None) => Ordering::Equal
  }
}

fn compare_titles(
  a: &str,
  b: &str
) -> Ordering {
  collation_key(a)
    .cmp(&collation_key(b))
    .then_with(|| a.cmp(b))
}

fn collation_key(title: &str) -> String {
  deunicode::deunicode(title)
    .to_lowercase()
}
