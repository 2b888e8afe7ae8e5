#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use taskboard_core::{BoardError, TaskApi};
use taskboard_shared::{Task, TaskDraft, TaskPriority, TaskStatus, TaskUpdate};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub set_status: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list + self.create + self.update + self.delete + self.set_status
    }
}

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    calls: CallCounts,
    failures: VecDeque<BoardError>,
    status_delays: Vec<(u64, Duration)>,
}

/// In-memory stand-in for the task backend, with the same validation and id rules
/// as the real service.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let backend = Self::default();
        backend.state.lock().tasks = tasks;
        backend
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    pub fn server_tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    /// Changes server truth behind the client's back.
    pub fn edit_server<F: FnOnce(&mut Vec<Task>)>(&self, f: F) {
        f(&mut self.state.lock().tasks);
    }

    /// The next call (of any kind) fails with `err`.
    pub fn fail_next(&self, err: BoardError) {
        self.state.lock().failures.push_back(err);
    }

    /// Status changes for `id` wait `delay` before answering.
    pub fn delay_status(&self, id: u64, delay: Duration) {
        self.state.lock().status_delays.push((id, delay));
    }

    fn take_failure(&self) -> Result<(), BoardError> {
        match self.state.lock().failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found() -> BoardError {
        BoardError::server(404, Some("Task not found".to_string()))
    }
}

pub fn task(id: u64, title: &str) -> Task {
    Task {
        id: Some(id),
        title: title.to_string(),
        description: Some(String::new()),
        priority: TaskPriority::Medium,
        deadline: None,
        status: TaskStatus::Incomplete,
        created_at: None,
    }
}

fn normalize_priority(priority: &TaskPriority) -> TaskPriority {
    match priority {
        TaskPriority::Other(_) => TaskPriority::Low,
        known => known.clone(),
    }
}

#[async_trait]
impl TaskApi for MemoryBackend {
    async fn list(&self) -> Result<Vec<Task>, BoardError> {
        self.state.lock().calls.list += 1;
        self.take_failure()?;
        Ok(self.state.lock().tasks.clone())
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, BoardError> {
        self.state.lock().calls.create += 1;
        self.take_failure()?;

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(BoardError::server(400, Some("Title is required".to_string())));
        }

        let mut state = self.state.lock();
        let id = state.tasks.iter().filter_map(|t| t.id).max().unwrap_or(0) + 1;
        let created = Task {
            id: Some(id),
            title: title.to_string(),
            description: Some(draft.description.trim().to_string()),
            priority: normalize_priority(&draft.priority),
            deadline: draft.deadline.clone(),
            status: TaskStatus::Incomplete,
            created_at: Some("2026-10-17T00:00:00Z".to_string()),
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: u64, update: &TaskUpdate) -> Result<Task, BoardError> {
        self.state.lock().calls.update += 1;
        self.take_failure()?;

        let title = update.title.trim();
        if title.is_empty() {
            return Err(BoardError::server(400, Some("Title is required".to_string())));
        }

        let mut state = self.state.lock();
        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(Self::not_found)?;
        slot.title = title.to_string();
        slot.description = Some(update.description.trim().to_string());
        slot.priority = normalize_priority(&update.priority);
        slot.deadline = update.deadline.clone();
        slot.status = if update.status.is_known() {
            update.status.clone()
        } else {
            TaskStatus::Incomplete
        };
        Ok(slot.clone())
    }

    async fn delete(&self, id: u64) -> Result<(), BoardError> {
        self.state.lock().calls.delete += 1;
        self.take_failure()?;

        let mut state = self.state.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != Some(id));
        if state.tasks.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn set_status(&self, id: u64, status: &TaskStatus) -> Result<Task, BoardError> {
        let delay = {
            let mut state = self.state.lock();
            state.calls.set_status += 1;
            state
                .status_delays
                .iter()
                .find(|(delayed, _)| *delayed == id)
                .map(|(_, delay)| *delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.take_failure()?;

        if !status.is_known() {
            return Err(BoardError::server(400, Some("Invalid status value".to_string())));
        }

        let mut state = self.state.lock();
        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(Self::not_found)?;
        slot.status = status.clone();
        Ok(slot.clone())
    }
}
