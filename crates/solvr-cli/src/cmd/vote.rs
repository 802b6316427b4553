//! `solvr vote`: spend voting rights on one solution of a task.
//!
//! Rights are server-authoritative. The ledger is seeded from the task's
//! metrics, the amount is checked locally, and only the server's reply
//! moves the remaining balance.

use anyhow::Result;
use clap::{ArgGroup, Args};
use serde::Serialize;
use solvr_core::actions::submit_vote;
use solvr_core::api::{TaskApi, UserVoteMetrics};
use solvr_core::auth::Permissions;
use solvr_core::ledger::{VotingLedger, amount_for_percentage};
use solvr_core::notify::NoticeLog;
use solvr_core::reconcile::{FetchOutcome, PagedList};
use tracing::debug;

use super::{api_failure, finish};
use crate::output::{CliError, fail, pretty_kv, render};
use crate::session::Context;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("how_much").required(true).args(["amount", "percent"])))]
pub struct VoteArgs {
    /// Task the solution belongs to.
    pub task_id: String,

    /// Solution to vote on.
    pub solution_id: String,

    /// Exact number of rights to spend.
    #[arg(long)]
    pub amount: Option<u64>,

    /// Share of your remaining rights to spend (0-100).
    #[arg(long, value_parser = parse_percent)]
    pub percent: Option<f64>,
}

fn parse_percent(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err("percent must be between 0 and 100".to_string())
    }
}

#[derive(Debug, Serialize)]
struct VoteResult {
    solution_id: String,
    amount: u64,
    remaining_rights: Option<u64>,
    total_votes: Option<u64>,
}

pub fn run_vote(args: &VoteArgs, ctx: &Context) -> Result<()> {
    let api = ctx.api()?;
    let task = match api.get_task(&args.task_id) {
        Ok(task) => task,
        Err(err) => return api_failure(ctx, &err),
    };

    let viewer = ctx.viewer();
    let permissions = Permissions::for_task(viewer.as_deref(), &task);
    let metrics = if permissions.can_vote {
        match api.voting_metrics(&task.id) {
            Ok(metrics) => metrics,
            Err(err) => return api_failure(ctx, &err),
        }
    } else {
        UserVoteMetrics::default()
    };
    let mut ledger = VotingLedger::from_metrics(&permissions, &metrics);

    // Walk the solution pages until the target shows up.
    let mut sink = ctx.sink();
    let mut list = PagedList::new("solutions", task.id.clone());
    let mut last_error = None;
    let mut source = |task_id: &String, page: u32| {
        let result = api.list_solutions(task_id, page);
        if let Err(err) = &result {
            last_error = Some(err.clone());
        }
        result
    };
    let mut outcome = list.initialize(&mut source, &mut sink);
    while list.state().get(&args.solution_id).is_none() && outcome == FetchOutcome::Applied {
        outcome = list.load_next_page(&mut source, &mut sink);
    }
    if let Some(err) = last_error.filter(|_| list.has_error()) {
        return api_failure(ctx, &err);
    }
    ledger.record_counts(list.items());
    let Some(solution) = list.state().get(&args.solution_id).cloned() else {
        return fail(
            ctx.output,
            &CliError::new(format!(
                "solution {} not found on task {}",
                args.solution_id, task.id
            )),
        );
    };

    let amount = match (args.amount, args.percent) {
        (Some(amount), _) => amount,
        (None, Some(percent)) => ledger
            .remaining_rights()
            .map_or(0, |remaining| amount_for_percentage(remaining, percent)),
        (None, None) => 0,
    };
    debug!(solution_id = %solution.id, amount, rights = ?ledger.remaining_rights(), "casting vote");

    let mut log = NoticeLog::new();
    let outcome = submit_vote(api.auth(), &api, &mut log, &mut ledger, &solution, amount);
    finish(ctx, &mut log, outcome)?;

    let result = VoteResult {
        amount,
        remaining_rights: ledger.remaining_rights(),
        total_votes: ledger.vote_count(&solution.id),
        solution_id: solution.id,
    };
    render(ctx.output, &result, |r, w| {
        pretty_kv(w, "Solution", &r.solution_id)?;
        pretty_kv(w, "Voted", r.amount.to_string())?;
        if let Some(total) = r.total_votes {
            pretty_kv(w, "Total votes", total.to_string())?;
        }
        if let Some(rights) = r.remaining_rights {
            pretty_kv(w, "Rights left", rights.to_string())?;
        }
        Ok(())
    })
}
