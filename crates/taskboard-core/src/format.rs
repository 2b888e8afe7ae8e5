use chrono::{
  DateTime,
  FixedOffset,
  NaiveDate,
  NaiveDateTime,
  Utc
};
use chrono_tz::Tz;
use taskboard_shared::{
  Task,
  TaskPriority,
  TaskStatus
};

const NAIVE_FORMATS: [&str; 4] = [
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%d %H:%M:%S"
];

const DISPLAY_DATETIME: &str =
  "%Y-%m-%d %H:%M";
const DISPLAY_DATE: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Deadline {
  Zoned(DateTime<FixedOffset>),
  Floating(NaiveDateTime),
  Day(NaiveDate)
}

fn parse_deadline_value(
  raw: &str
) -> Option<Deadline> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(zoned) =
    DateTime::parse_from_rfc3339(raw)
  {
    return Some(Deadline::Zoned(zoned));
  }

  for fmt in NAIVE_FORMATS {
    if let Ok(naive) =
      NaiveDateTime::parse_from_str(
        raw, fmt
      )
    {
      return Some(Deadline::Floating(
        naive
      ));
    }
  }

  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .map(Deadline::Day)
}

/// Instant used to order deadlines.
/// Values without an offset are read as
/// UTC so the ordering never depends on
/// the machine's timezone. Unparseable
/// text yields `None`.
#[must_use]
pub fn deadline_instant(
  raw: &str
) -> Option<DateTime<Utc>> {
  match parse_deadline_value(raw)? {
    | Deadline::Zoned(zoned) => {
      Some(zoned.with_timezone(&Utc))
    }
    | Deadline::Floating(naive) => {
      Some(naive.and_utc())
    }
    | Deadline::Day(day) => {
      day
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
    }
  }
}

/// Human-friendly deadline text. Values
/// carrying an offset are shown in `tz`;
/// wall-clock values are shown as
/// written. Text that does not parse is
/// returned unchanged.
#[must_use]
pub fn format_deadline(
  deadline: Option<&str>,
  tz: &Tz
) -> String {
  let Some(raw) = deadline else {
    return String::new();
  };

  match parse_deadline_value(raw) {
    | Some(Deadline::Zoned(zoned)) => {
      zoned
        .with_timezone(tz)
        .format(DISPLAY_DATETIME)
        .to_string()
    }
    | Some(Deadline::Floating(naive)) => {
      naive
        .format(DISPLAY_DATETIME)
        .to_string()
    }
    | Some(Deadline::Day(day)) => {
      day.format(DISPLAY_DATE).to_string()
    }
    | None => raw.trim().to_string()
  }
}

/// Style class for a priority badge.
#[must_use]
pub fn priority_class(
  priority: &TaskPriority
) -> &'static str {
  match priority {
    | TaskPriority::High => "high",
    | TaskPriority::Medium => "medium",
    | _ => "low"
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct Progress {
  pub completed: usize,
  pub total:     usize
}

impl Progress {
  pub fn of(tasks: &[Task]) -> Self {
    let completed = tasks
      .iter()
      .filter(|task| {
        task.status
          == TaskStatus::Completed
      })
      .count();
    Self {
      completed,
      total: tasks.len()
    }
  }

  /// Whole percent of completed tasks,
  /// rounded half up; 0 for an empty
  /// board.
  pub fn percent(&self) -> u8 {
    if self.total == 0 {
      return 0;
    }
    let ratio = self.completed as f64
      / self.total as f64;
    (ratio * 100.0).round() as u8
  }
}
