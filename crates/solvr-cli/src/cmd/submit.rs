use anyhow::Result;
use clap::Args;
use solvr_core::actions::submit_solution;
use solvr_core::api::TaskApi;
use solvr_core::notify::NoticeLog;
use solvr_core::reconcile::PagedList;
use solvr_core::validate::SolutionDraft;

use super::{api_failure, finish};
use crate::output::render_item;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Task to answer.
    pub task_id: String,

    /// Solution text.
    #[arg(long)]
    pub content: String,
}

pub fn run_submit(args: &SubmitArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let task = match api.get_task(&args.task_id) {
        Ok(task) => task,
        Err(err) => return api_failure(ctx, &err),
    };

    let draft = SolutionDraft {
        content: args.content.clone(),
    };
    let mut list = PagedList::new("solutions", task.id.clone());
    let mut log = NoticeLog::new();
    let outcome = submit_solution(api.auth(), &api, &mut log, &mut list, &task, &draft);
    let solution = finish(ctx, &mut log, outcome)?;
    render_item(&solution, ctx.output)?;
    Ok(())
}
