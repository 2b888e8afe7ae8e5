use std::io::Write;

use anyhow::anyhow;
use taskboard_shared::TaskStatus;
use tracing::{info, instrument};

use crate::error::{BoardError, Operation};
use crate::remote::TaskApi;
use crate::render::Renderer;
use crate::session::{EditSession, TaskForm};
use crate::store::TaskStore;
use crate::view::{SortKey, ViewQuery};

/// Runs one CLI command against `store` and redraws the board into `out`.
#[instrument(skip(store, renderer, out))]
pub async fn dispatch<A: TaskApi, W: Write>(
    store: &TaskStore<A>,
    renderer: &Renderer,
    out: &mut W,
    default_sort: SortKey,
    command: crate::cli::Command,
) -> anyhow::Result<()> {
    use crate::cli::Command;

    store.load().await.map_err(|err| report(Operation::Load, &err))?;

    let mut query = ViewQuery::new("", default_sort);
    match command {
        Command::Board { search, sort } => {
            query.search = search;
            if let Some(sort) = sort {
                query.sort = SortKey::parse(&sort);
            }
        }
        Command::Add {
            title,
            description,
            priority,
            deadline,
        } => {
            let mut session = EditSession::Creating;
            let mut form = TaskForm {
                title,
                description,
                priority,
                deadline: deadline.unwrap_or_default(),
            };
            let created = store
                .submit(&mut session, &mut form)
                .await
                .map_err(|err| report(Operation::Create, &err))?;
            info!(id = ?created.id, "task added");
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
            deadline,
        } => {
            let task = store
                .get(id)
                .ok_or_else(|| anyhow!("no task with id {id} on the board"))?;

            let mut session = EditSession::Creating;
            let mut form = session
                .begin_edit(&task)
                .map_err(|err| report(Operation::Update, &err))?;
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(priority) = priority {
                form.priority = priority;
            }
            if let Some(deadline) = deadline {
                form.deadline = deadline;
            }

            store
                .submit(&mut session, &mut form)
                .await
                .map_err(|err| report(Operation::Update, &err))?;
            info!(id, "task saved");
        }
        Command::Rm { id } => {
            store
                .remove(id)
                .await
                .map_err(|err| report(Operation::Remove, &err))?;
            info!(id, "task deleted");
        }
        Command::Status { id, status } => {
            let status = TaskStatus::from(status.as_str());
            let result = store.set_status(id, status).await;
            if let Err(err) = result {
                // The store has already resynced; show what the server holds now.
                draw(store, renderer, out, &query)?;
                return Err(report(Operation::ChangeStatus, &err));
            }
            info!(id, "status changed");
        }
    }

    draw(store, renderer, out, &query)
}

fn draw<A: TaskApi, W: Write>(
    store: &TaskStore<A>,
    renderer: &Renderer,
    out: &mut W,
    query: &ViewQuery,
) -> anyhow::Result<()> {
    renderer.write_board(out, &store.project(query), store.progress())?;
    out.flush()?;
    Ok(())
}

fn report(op: Operation, err: &BoardError) -> anyhow::Error {
    anyhow!(op.report(err))
}
