//! `solvr task <id>`: one task, plus what the viewer may do on it.

use anyhow::Result;
use clap::Args;
use solvr_core::api::{TaskApi, UserVoteMetrics};
use solvr_core::auth::Permissions;
use solvr_core::ledger::initial_rights;
use tracing::warn;

use super::api_failure;
use crate::output::render_item;
use crate::session::Context;
use crate::views::TaskDetail;

#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Task ID.
    pub id: String,
}

pub fn run_task(args: &TaskArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let task = match api.get_task(&args.id) {
        Ok(task) => task,
        Err(err) => return api_failure(ctx, &err),
    };

    let viewer = ctx.viewer();
    let permissions = Permissions::for_task(viewer.as_deref(), &task);
    let metrics = if permissions.can_vote {
        // Rights are a nicety here; the task itself still renders.
        api.voting_metrics(&task.id).unwrap_or_else(|err| {
            warn!(task_id = %task.id, error = %err, "could not load voting metrics");
            UserVoteMetrics::default()
        })
    } else {
        UserVoteMetrics::default()
    };

    let detail = TaskDetail {
        voting_rights: initial_rights(&permissions, &metrics),
        task,
        permissions,
    };
    render_item(&detail, ctx.output)?;
    Ok(())
}
