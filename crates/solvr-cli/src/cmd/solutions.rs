use anyhow::Result;
use clap::Args;
use solvr_core::api::TaskApi;
use solvr_core::notify::Notice;
use solvr_core::reconcile::PagedList;

use super::{PageArgs, api_failure, collect_pages};
use crate::output::{render_list, render_notice};
use crate::session::Context;

#[derive(Args, Debug)]
pub struct SolutionsArgs {
    /// Task whose solutions to list.
    pub task_id: String,

    #[command(flatten)]
    pub pages: PageArgs,
}

pub fn run_solutions(args: &SolutionsArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let mut list = PagedList::new("solutions", args.task_id.clone());
    let mut source = |task_id: &String, page: u32| api.list_solutions(task_id, page);

    if let Err(err) = collect_pages(&mut list, &mut source, &mut ctx.sink(), args.pages) {
        return api_failure(ctx, &err);
    }
    render_list(list.items(), ctx.output)?;

    if list.has_more() && !ctx.quiet {
        render_notice(
            ctx.output,
            &Notice::info("More solutions available; pass --pages N or --all"),
        )?;
    }
    Ok(())
}
