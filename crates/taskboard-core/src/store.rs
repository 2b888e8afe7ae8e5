use parking_lot::Mutex;
use taskboard_shared::{Task, TaskDraft, TaskStatus, TaskUpdate};
use tracing::{debug, info, instrument, warn};

use crate::error::{BoardError, Operation};
use crate::format::Progress;
use crate::remote::TaskApi;
use crate::session::{EditSession, TaskForm};
use crate::view::{BoardView, ViewQuery, project};

const TITLE_REQUIRED: &str = "Title is required.";

/// Local copy of the task collection, kept in step with the backend behind `A`.
///
/// Every mutation is request-then-apply: the collection only changes once the
/// server has answered, and each answer is applied as one whole replace, insert or
/// removal. The lock is never held across an `.await`, so several operations can be
/// in flight on the same store at once; for a given id the last response to arrive
/// wins.
pub struct TaskStore<A> {
    api: A,
    tasks: Mutex<Vec<Task>>,
}

impl<A: TaskApi> TaskStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the collection in local order.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    pub fn get(&self, id: u64) -> Option<Task> {
        self.tasks
            .lock()
            .iter()
            .find(|task| task.id == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    pub fn progress(&self) -> Progress {
        Progress::of(&self.tasks.lock())
    }

    pub fn project(&self, query: &ViewQuery) -> BoardView {
        project(&self.tasks.lock(), &query.search, query.sort)
    }

    /// Replaces the whole collection with the server's list. On failure the
    /// current collection is kept as is.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize, BoardError> {
        let fetched = self.api.list().await.inspect_err(|err| {
            warn!(error = %err, "{}", Operation::Load.report(err));
        })?;

        let count = fetched.len();
        *self.tasks.lock() = fetched;
        info!(count, "task collection loaded");
        Ok(count)
    }

    #[instrument(skip(self, draft), fields(title_len = draft.title.len()))]
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, BoardError> {
        if draft.title.trim().is_empty() {
            return Err(BoardError::validation(TITLE_REQUIRED));
        }

        let created = self.api.create(&draft).await.inspect_err(|err| {
            warn!(error = %err, "{}", Operation::Create.report(err));
        })?;

        let mut tasks = self.tasks.lock();
        match tasks
            .iter()
            .position(|task| created.id.is_some() && task.id == created.id)
        {
            // Only possible if a load raced this create; keep ids unique.
            Some(idx) => tasks[idx] = created.clone(),
            None => tasks.push(created.clone()),
        }
        debug!(id = ?created.id, count = tasks.len(), "task created");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: u64, update: TaskUpdate) -> Result<Task, BoardError> {
        if update.title.trim().is_empty() {
            return Err(BoardError::validation(TITLE_REQUIRED));
        }

        let updated = self.api.update(id, &update).await.inspect_err(|err| {
            warn!(error = %err, "{}", Operation::Update.report(err));
        })?;

        self.replace_in_place(&updated);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: u64) -> Result<(), BoardError> {
        self.api.delete(id).await.inspect_err(|err| {
            warn!(error = %err, "{}", Operation::Remove.report(err));
        })?;

        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|task| task.id != Some(id));
        debug!(removed = before - tasks.len(), "task removed");
        Ok(())
    }

    /// Sends the status change and applies the server's full record. If the server
    /// refuses, the collection is reloaded so it matches server truth again, and the
    /// original error is returned.
    #[instrument(skip(self, status), fields(status = %status))]
    pub async fn set_status(&self, id: u64, status: TaskStatus) -> Result<Task, BoardError> {
        match self.api.set_status(id, &status).await {
            Ok(updated) => {
                self.replace_in_place(&updated);
                Ok(updated)
            }
            Err(err) => {
                warn!(error = %err, "{}", Operation::ChangeStatus.report(&err));
                if let Err(resync_err) = self.load().await {
                    warn!(error = %resync_err, "resync after failed status change also failed");
                }
                Err(err)
            }
        }
    }

    /// Routes a form submit to `create` or `update` depending on `session`. On
    /// success the session returns to `Creating` and `form` is cleared; on failure
    /// both are left untouched.
    #[instrument(skip(self, form), fields(target = ?session.target()))]
    pub async fn submit(
        &self,
        session: &mut EditSession,
        form: &mut TaskForm,
    ) -> Result<Task, BoardError> {
        let saved = match session.target() {
            None => self.create(form.to_draft()).await?,
            Some(id) => {
                let status = self.get(id).map(|task| task.status).unwrap_or_default();
                self.update(id, form.to_update(status)).await?
            }
        };

        *form = session.submit_succeeded();
        Ok(saved)
    }

    fn replace_in_place(&self, updated: &Task) {
        let mut tasks = self.tasks.lock();
        match tasks
            .iter_mut()
            .find(|task| updated.id.is_some() && task.id == updated.id)
        {
            Some(slot) => {
                *slot = updated.clone();
                debug!(id = ?updated.id, "task replaced in place");
            }
            None => debug!(id = ?updated.id, "updated task not in local collection; skipping"),
        }
    }
}
