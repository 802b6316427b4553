use anyhow::Result;
use clap::Args;
use solvr_core::actions::fund_task;
use solvr_core::api::{TaskApi, TaskFilter};
use solvr_core::notify::NoticeLog;
use solvr_core::reconcile::PagedList;
use solvr_core::validate::FundDraft;

use super::{api_failure, finish};
use crate::output::render_item;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct FundArgs {
    /// Task to fund.
    pub task_id: String,

    /// Amount to add.
    pub amount: u64,
}

pub fn run_fund(args: &FundArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let task = match api.get_task(&args.task_id) {
        Ok(task) => task,
        Err(err) => return api_failure(ctx, &err),
    };

    let mut list = PagedList::new("tasks", TaskFilter::default());
    list.insert_local(task.clone());
    let mut log = NoticeLog::new();
    let draft = FundDraft {
        amount: args.amount,
    };
    let outcome = fund_task(api.auth(), &api, &mut log, &mut list, &task, &draft);
    let updated = finish(ctx, &mut log, outcome)?;
    render_item(&updated, ctx.output)?;
    Ok(())
}
