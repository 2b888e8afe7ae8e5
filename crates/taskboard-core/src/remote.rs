use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskboard_shared::{ApiErrorBody, StatusPatch, Task, TaskDraft, TaskStatus, TaskUpdate};
use tracing::{debug, instrument, warn};

use crate::error::BoardError;

const TASKS_PATH: &str = "/api/tasks";

/// The five calls the board makes against the task backend.
///
/// Every failure, whether transport, decoding or an error status, comes back as a
/// [`BoardError`]; implementations never panic on bad input from the wire.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, BoardError>;

    async fn create(&self, draft: &TaskDraft) -> Result<Task, BoardError>;

    /// Full replace of the editable fields (and status) of task `id`.
    async fn update(&self, id: u64, update: &TaskUpdate) -> Result<Task, BoardError>;

    async fn delete(&self, id: u64) -> Result<(), BoardError>;

    async fn set_status(&self, id: u64, status: &TaskStatus) -> Result<Task, BoardError>;
}

#[async_trait]
impl<T> TaskApi for Arc<T>
where
    T: TaskApi + ?Sized,
{
    async fn list(&self) -> Result<Vec<Task>, BoardError> {
        (**self).list().await
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, BoardError> {
        (**self).create(draft).await
    }

    async fn update(&self, id: u64, update: &TaskUpdate) -> Result<Task, BoardError> {
        (**self).update(id, update).await
    }

    async fn delete(&self, id: u64) -> Result<(), BoardError> {
        (**self).delete(id).await
    }

    async fn set_status(&self, id: u64, status: &TaskStatus) -> Result<Task, BoardError> {
        (**self).set_status(id, status).await
    }
}

/// [`TaskApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BoardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BoardError::fetch(format!("failed building HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{TASKS_PATH}", self.base_url)
    }

    fn task_url(&self, id: u64) -> String {
        format!("{}{TASKS_PATH}/{id}", self.base_url)
    }

    fn with_json<B: Serialize>(
        request: RequestBuilder,
        body: &B,
    ) -> Result<RequestBuilder, BoardError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| BoardError::fetch(format!("failed encoding request body: {err}")))?;
        Ok(request
            .header(CONTENT_TYPE, "application/json")
            .body(payload))
    }

    /// Sends `request` and returns the body of a 2xx response. Error statuses become
    /// [`BoardError::Server`] carrying the backend's `{error}` message when it sent one.
    async fn execute(&self, call: &'static str, request: RequestBuilder) -> Result<String, BoardError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| {
                warn!(call, error = %err, "task API request failed");
                BoardError::fetch(format!("{call} request failed: {err}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            warn!(call, status = %status, error = %err, "failed reading task API response body");
            BoardError::fetch(format!("failed reading {call} response: {err}"))
        })?;

        if status.is_success() {
            debug!(call, status = %status, bytes = body.len(), "task API call succeeded");
            return Ok(body);
        }

        let err = server_error(status, &body);
        warn!(call, status = %status, error = %err, "task API returned error status");
        Err(err)
    }
}

fn server_error(status: StatusCode, body: &str) -> BoardError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|payload| payload.error)
        .filter(|message| !message.trim().is_empty());
    BoardError::server(status.as_u16(), message)
}

fn decode<T: DeserializeOwned>(call: &'static str, body: &str) -> Result<T, BoardError> {
    serde_json::from_str(body).map_err(|err| {
        warn!(call, error = %err, "malformed task API response");
        BoardError::fetch(format!("malformed {call} response: {err}"))
    })
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list(&self) -> Result<Vec<Task>, BoardError> {
        let body = self
            .execute("list", self.client.get(self.collection_url()))
            .await?;
        decode("list", &body)
    }

    #[instrument(skip(self, draft), fields(title_len = draft.title.len()))]
    async fn create(&self, draft: &TaskDraft) -> Result<Task, BoardError> {
        let request = Self::with_json(self.client.post(self.collection_url()), draft)?;
        let body = self.execute("create", request).await?;
        decode("create", &body)
    }

    #[instrument(skip(self, update), fields(status = %update.status))]
    async fn update(&self, id: u64, update: &TaskUpdate) -> Result<Task, BoardError> {
        let request = Self::with_json(self.client.put(self.task_url(id)), update)?;
        let body = self.execute("update", request).await?;
        decode("update", &body)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: u64) -> Result<(), BoardError> {
        self.execute("delete", self.client.delete(self.task_url(id)))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, status), fields(status = %status))]
    async fn set_status(&self, id: u64, status: &TaskStatus) -> Result<Task, BoardError> {
        let url = format!("{}/status", self.task_url(id));
        let patch = StatusPatch {
            status: status.clone(),
        };
        let request = Self::with_json(self.client.patch(url), &patch)?;
        let body = self.execute("set_status", request).await?;
        decode("set_status", &body)
    }
}
