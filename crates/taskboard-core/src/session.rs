use taskboard_shared::{Task, TaskDraft, TaskPriority, TaskStatus, TaskUpdate};
use tracing::debug;

use crate::error::BoardError;

/// Whether a form submit creates a new task or saves an edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Creating,
    Editing(u64),
}

impl EditSession {
    pub fn target(&self) -> Option<u64> {
        match self {
            Self::Creating => None,
            Self::Editing(id) => Some(*id),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    /// `Creating -> Editing(task.id)`; returns the form pre-filled from `task`.
    pub fn begin_edit(&mut self, task: &Task) -> Result<TaskForm, BoardError> {
        if let Self::Editing(current) = self {
            return Err(BoardError::validation(format!(
                "already editing task {current}; cancel or save it first"
            )));
        }
        let id = task
            .id
            .ok_or_else(|| BoardError::validation("cannot edit a task without an id"))?;

        debug!(id, "edit session started");
        *self = Self::Editing(id);
        Ok(TaskForm::from_task(task))
    }

    /// `Editing -> Creating`; returns a cleared form.
    pub fn cancel(&mut self) -> Result<TaskForm, BoardError> {
        match self {
            Self::Editing(id) => {
                debug!(id = *id, "edit session cancelled");
                *self = Self::Creating;
                Ok(TaskForm::default())
            }
            Self::Creating => Err(BoardError::validation("no edit in progress to cancel")),
        }
    }

    /// Either state returns to `Creating` with a cleared form.
    pub fn submit_succeeded(&mut self) -> TaskForm {
        *self = Self::Creating;
        TaskForm::default()
    }
}

/// Values of the add/edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    /// Raw input; blank means no deadline.
    pub deadline: String,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description_or_empty().to_string(),
            priority: task.priority.clone(),
            deadline: task.deadline.clone().unwrap_or_default(),
        }
    }

    fn deadline_value(&self) -> Option<String> {
        let trimmed = self.deadline.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority.clone(),
            deadline: self.deadline_value(),
        }
    }

    /// Update payload; `status` comes from the task being edited since the form
    /// does not edit it.
    pub fn to_update(&self, status: TaskStatus) -> TaskUpdate {
        TaskUpdate {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority.clone(),
            deadline: self.deadline_value(),
            status,
        }
    }
}
