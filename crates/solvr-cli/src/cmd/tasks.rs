//! `solvr tasks`: list tasks, optionally filtered by status and kind.

use anyhow::Result;
use clap::Args;
use solvr_core::api::{TaskApi, TaskFilter};
use solvr_core::model::{Task, TaskKind, TaskStatus};
use solvr_core::notify::Notice;
use solvr_core::reconcile::PagedList;
use tracing::debug;

use super::{PageArgs, api_failure, collect_pages};
use crate::output::{render_list, render_notice};
use crate::session::Context;

#[derive(Args, Debug)]
pub struct TasksArgs {
    /// Only tasks in this state (active, ended, successful, failed, deleted).
    #[arg(long)]
    pub status: Option<TaskStatus>,

    /// Only tasks of this kind (community, personal).
    #[arg(long)]
    pub kind: Option<TaskKind>,

    /// Also show deleted tasks.
    #[arg(long)]
    pub include_deleted: bool,

    #[command(flatten)]
    pub pages: PageArgs,
}

pub fn run_tasks(args: &TasksArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let filter = TaskFilter {
        status: args.status,
        kind: args.kind,
    };
    let mut list = PagedList::new("tasks", filter);
    let mut source = |filter: &TaskFilter, page: u32| api.list_tasks(filter, page);

    if let Err(err) = collect_pages(&mut list, &mut source, &mut ctx.sink(), args.pages) {
        return api_failure(ctx, &err);
    }
    debug!(count = list.items().len(), page = list.loaded_page(), "tasks loaded");

    // Asking for deleted tasks by status means showing them.
    let show_deleted = args.include_deleted || args.status == Some(TaskStatus::Deleted);
    let visible = list
        .state()
        .visible(move |task: &Task| show_deleted || !task.status.is_deleted());
    render_list(visible, ctx.output)?;

    if list.has_more() && !ctx.quiet {
        render_notice(
            ctx.output,
            &Notice::info("More tasks available; pass --pages N or --all"),
        )?;
    }
    Ok(())
}
