use anyhow::Result;
use clap::Args;
use solvr_core::api::TaskApi;
use solvr_core::error::ErrorCode;
use solvr_core::reconcile::PagedList;

use super::{PageArgs, api_failure, collect_pages};
use crate::output::{CliError, fail, render_list};
use crate::session::Context;

#[derive(Args, Debug)]
pub struct SubmissionsArgs {
    #[command(flatten)]
    pub pages: PageArgs,
}

/// The signed-in user's own solutions across all tasks.
pub fn run_submissions(args: &SubmissionsArgs, ctx: &Context) -> Result<()> {
    if ctx.viewer().is_none() {
        return fail(ctx.output, &CliError::from_code(ErrorCode::Unauthenticated));
    }
    let api = ctx.api()?;
    let mut list = PagedList::new("submissions", ());
    let mut source = |_: &(), page: u32| api.list_submissions(page);

    if let Err(err) = collect_pages(&mut list, &mut source, &mut ctx.sink(), args.pages) {
        return api_failure(ctx, &err);
    }
    render_list(list.items(), ctx.output)?;
    Ok(())
}
