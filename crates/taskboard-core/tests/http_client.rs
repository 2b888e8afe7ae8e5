use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::json;
use taskboard_core::{ErrorKind, HttpTaskApi, TaskApi, TaskStore};
use taskboard_shared::{StatusPatch, Task, TaskDraft, TaskPriority, TaskStatus, TaskUpdate};

type Shared = Arc<Mutex<Vec<Task>>>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn list_tasks(State(state): State<Shared>) -> Json<Vec<Task>> {
    Json(state.lock().clone())
}

async fn create_task(State(state): State<Shared>, Json(draft): Json<TaskDraft>) -> Response {
    if draft.title.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Title is required");
    }
    let mut tasks = state.lock();
    let id = tasks.iter().filter_map(|t| t.id).max().unwrap_or(0) + 1;
    let task = Task {
        id: Some(id),
        title: draft.title.trim().to_string(),
        description: Some(draft.description),
        priority: draft.priority,
        deadline: draft.deadline,
        status: TaskStatus::Incomplete,
        created_at: Some("2026-10-17T08:00:00Z".to_string()),
    };
    tasks.push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn update_task(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(update): Json<TaskUpdate>,
) -> Response {
    let mut tasks = state.lock();
    let Some(slot) = tasks.iter_mut().find(|t| t.id == Some(id)) else {
        return error(StatusCode::NOT_FOUND, "Task not found");
    };
    slot.title = update.title;
    slot.description = Some(update.description);
    slot.priority = update.priority;
    slot.deadline = update.deadline;
    slot.status = update.status;
    Json(slot.clone()).into_response()
}

async fn delete_task(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut tasks = state.lock();
    let before = tasks.len();
    tasks.retain(|t| t.id != Some(id));
    if tasks.len() == before {
        return error(StatusCode::NOT_FOUND, "Task not found");
    }
    Json(json!({ "message": "Deleted" })).into_response()
}

async fn patch_status(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<StatusPatch>,
) -> Response {
    if !body.status.is_known() {
        return error(StatusCode::BAD_REQUEST, "Invalid status value");
    }
    let mut tasks = state.lock();
    let Some(slot) = tasks.iter_mut().find(|t| t.id == Some(id)) else {
        return error(StatusCode::NOT_FOUND, "Task not found");
    };
    slot.status = body.status;
    Json(slot.clone()).into_response()
}

async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve test app");
    });
    addr
}

async fn backend(seed: Vec<Task>) -> (Shared, HttpTaskApi) {
    let state: Shared = Arc::new(Mutex::new(seed));
    let router = Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/tasks/{id}/status", patch(patch_status))
        .with_state(Arc::clone(&state));
    let addr = spawn_server(router).await;
    let api = HttpTaskApi::new(&format!("http://{addr}/"), Duration::from_secs(5))
        .expect("build client");
    (state, api)
}

fn seed_task(id: u64, title: &str) -> Task {
    Task {
        id: Some(id),
        title: title.to_string(),
        description: None,
        priority: TaskPriority::Medium,
        deadline: None,
        status: TaskStatus::Incomplete,
        created_at: None,
    }
}

#[test]
fn base_url_drops_trailing_slash() {
    let api = HttpTaskApi::new(" http://127.0.0.1:5000/ ", Duration::from_secs(1))
        .expect("build client");
    assert_eq!(api.base_url(), "http://127.0.0.1:5000");
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let (state, api) = backend(vec![seed_task(1, "seeded")]).await;

    let listed = api.list().await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "seeded");

    let created = api
        .create(&TaskDraft {
            title: "Buy milk".to_string(),
            description: String::new(),
            priority: TaskPriority::High,
            deadline: Some("2026-10-20T09:00".to_string()),
        })
        .await
        .expect("create");
    assert_eq!(created.id, Some(2));
    assert_eq!(created.status, TaskStatus::Incomplete);
    assert_eq!(created.created_at.as_deref(), Some("2026-10-17T08:00:00Z"));

    let updated = api
        .update(
            2,
            &TaskUpdate {
                title: "Buy oat milk".to_string(),
                description: "the barista one".to_string(),
                priority: TaskPriority::Low,
                deadline: None,
                status: TaskStatus::InProgress,
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.title, "Buy oat milk");
    assert_eq!(updated.status, TaskStatus::InProgress);

    let moved = api
        .set_status(2, &TaskStatus::Completed)
        .await
        .expect("set status");
    assert_eq!(moved.status, TaskStatus::Completed);

    api.delete(1).await.expect("delete");
    let remaining: Vec<_> = state.lock().iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec![Some(2)]);
}

#[tokio::test]
async fn error_payloads_become_server_errors() {
    let (_state, api) = backend(vec![seed_task(1, "only")]).await;

    let err = api.delete(7).await.expect_err("delete missing");
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "Task not found");

    let err = api
        .set_status(1, &TaskStatus::Other("paused".to_string()))
        .await
        .expect_err("invalid status");
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Invalid status value");

    let err = api
        .create(&TaskDraft {
            title: " ".to_string(),
            ..TaskDraft::default()
        })
        .await
        .expect_err("blank title at server");
    assert_eq!(err.message(), "Title is required");
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_reason_phrase() {
    let router = Router::new().route(
        "/api/tasks/{id}",
        put(|| async { (StatusCode::SERVICE_UNAVAILABLE, "upstream down") }),
    );
    let addr = spawn_server(router).await;
    let api = HttpTaskApi::new(&format!("http://{addr}"), Duration::from_secs(5))
        .expect("build client");

    let err = api
        .update(
            3,
            &TaskUpdate {
                title: "x".to_string(),
                ..TaskUpdate::default()
            },
        )
        .await
        .expect_err("503");
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.message(), "Service Unavailable");
}

#[tokio::test]
async fn malformed_success_body_is_a_fetch_error() {
    let router = Router::new().route("/api/tasks", get(|| async { "<html>not json</html>" }));
    let addr = spawn_server(router).await;
    let api = HttpTaskApi::new(&format!("http://{addr}"), Duration::from_secs(5))
        .expect("build client");

    let store = TaskStore::new(api);
    let err = store.load().await.expect_err("malformed list");
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(err.message().starts_with("malformed list response"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_fetch_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);

    let api = HttpTaskApi::new(&format!("http://{addr}"), Duration::from_secs(2))
        .expect("build client");
    let err = api.list().await.expect_err("nothing listening");
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

#[tokio::test]
async fn store_over_http_resyncs_after_rejected_status() {
    let (state, api) = backend(vec![seed_task(1, "a"), seed_task(2, "b")]).await;
    let store = TaskStore::new(api);
    store.load().await.expect("load");

    state.lock().retain(|t| t.id != Some(2));
    let err = store
        .set_status(2, TaskStatus::Completed)
        .await
        .expect_err("task 2 is gone");
    assert_eq!(err.status(), Some(404));

    let ids: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![Some(1)]);
}
