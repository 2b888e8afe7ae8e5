pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod remote;
pub mod render;
pub mod session;
pub mod store;
pub mod view;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use error::{
  BoardError,
  ErrorKind,
  Operation
};
pub use remote::{
  HttpTaskApi,
  TaskApi
};
pub use session::{
  EditSession,
  TaskForm
};
pub use store::TaskStore;
pub use taskboard_shared::{
  Task,
  TaskDraft,
  TaskPriority,
  TaskStatus,
  TaskUpdate
};
pub use view::{
  BoardView,
  SortKey,
  ViewQuery,
  project
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taskboard CLI"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
      .chain(
        cli.api.map(|url| {
          ("api_url".to_string(), url)
        })
      )
  )?;
  debug!(?cfg, "effective config");

  let api = HttpTaskApi::new(
    &cfg.api_url,
    cfg.timeout()
  )
  .with_context(|| {
    format!(
      "failed to set up task API client \
       for {}",
      cfg.api_url
    )
  })?;
  let store = TaskStore::new(api);
  let renderer =
    render::Renderer::new(&cfg)?;

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;

  let mut stdout = io::stdout().lock();
  runtime.block_on(commands::dispatch(
    &store,
    &renderer,
    &mut stdout,
    cfg.sort_key(),
    cli.command.unwrap_or_default()
  ))?;

  info!("done");
  Ok(())
}
