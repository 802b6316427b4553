use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use solvr_core::actions::create_task;
use solvr_core::api::TaskFilter;
use solvr_core::model::TaskKind;
use solvr_core::notify::NoticeLog;
use solvr_core::reconcile::PagedList;
use solvr_core::validate::TaskDraft;

use super::finish;
use crate::output::render_item;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct CreateTaskArgs {
    /// Task title (single line, up to 120 chars).
    #[arg(long)]
    pub title: String,

    /// What a good solution looks like.
    #[arg(long)]
    pub description: String,

    /// Who may vote and fund: community or personal.
    #[arg(long, default_value = "community")]
    pub kind: TaskKind,

    /// Closing time, RFC 3339 (e.g. 2026-12-31T23:59:00Z).
    #[arg(long)]
    pub deadline: Option<DateTime<Utc>>,

    /// Initial funding amount.
    #[arg(long = "fund")]
    pub initial_fund: Option<u64>,
}

pub fn run_create_task(args: &CreateTaskArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let draft = TaskDraft {
        title: args.title.clone(),
        description: args.description.clone(),
        kind: args.kind,
        deadline: args.deadline,
        initial_fund: args.initial_fund,
    };

    let mut list = PagedList::new("tasks", TaskFilter::default());
    let mut log = NoticeLog::new();
    let outcome = create_task(api.auth(), &api, &mut log, &mut list, &draft);
    let task = finish(ctx, &mut log, outcome)?;
    render_item(&task, ctx.output)?;
    Ok(())
}
