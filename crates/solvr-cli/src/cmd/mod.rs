pub mod completions;
pub mod config;
pub mod create_task;
pub mod fund;
pub mod profile;
pub mod solutions;
pub mod submissions;
pub mod submit;
pub mod task;
pub mod tasks;
pub mod vote;

use anyhow::Result;
use clap::Args;
use solvr_core::actions::ActionOutcome;
use solvr_core::api::ApiError;
use solvr_core::model::Entity;
use solvr_core::notify::{NoticeLog, NoticeSink};
use solvr_core::reconcile::{FetchOutcome, PageSource, PagedList};

use crate::output::{CliError, fail, render_notice};
use crate::session::Context;

/// How far to follow a list's pagination cursor.
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Number of pages to load.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Follow the cursor to the last page.
    #[arg(long, conflicts_with = "pages")]
    pub all: bool,
}

impl PageArgs {
    const fn allows(self, loaded: u32) -> bool {
        self.all || loaded < self.pages
    }
}

/// Load page 1, then follow the server cursor as far as `pages` allows.
///
/// Only a failed first page is an error; a later failure keeps what was
/// loaded and is reported through `sink`.
pub fn collect_pages<T: Entity, F>(
    list: &mut PagedList<T, F>,
    source: &mut impl PageSource<T, F>,
    sink: &mut dyn NoticeSink,
    pages: PageArgs,
) -> Result<(), ApiError> {
    let mut first_error = None;
    let mut tracked = |filter: &F, page: u32| {
        let result = source.fetch(filter, page);
        if let Err(err) = &result {
            first_error.get_or_insert_with(|| err.clone());
        }
        result
    };

    list.initialize(&mut tracked, sink);
    let mut loaded = 1;
    while pages.allows(loaded) {
        match list.load_next_page(&mut tracked, sink) {
            FetchOutcome::Applied => loaded += 1,
            _ => break,
        }
    }

    if list.has_error() {
        return Err(first_error.unwrap_or_else(|| ApiError::Business {
            message: "first page failed".to_string(),
        }));
    }
    Ok(())
}

/// Print a failed fetch as a structured error and fail the command.
pub fn api_failure<T>(ctx: &Context, err: &ApiError) -> Result<T> {
    fail(ctx.output, &CliError::from(err))
}

/// Unwrap an action outcome: print its notices on success, or the matching
/// structured error otherwise.
pub fn finish<T>(ctx: &Context, log: &mut NoticeLog, outcome: ActionOutcome<T>) -> Result<T> {
    match outcome {
        ActionOutcome::Done(value) => {
            if !ctx.quiet {
                for notice in log.drain() {
                    render_notice(ctx.output, &notice)?;
                }
            }
            Ok(value)
        }
        ActionOutcome::Disabled(code) => fail(ctx.output, &CliError::from_code(code)),
        ActionOutcome::Invalid(err) => fail(ctx.output, &CliError::from(&err)),
        ActionOutcome::Refused(err) => fail(ctx.output, &CliError::coded(err.to_string(), err.code())),
        ActionOutcome::Failed(err) => api_failure(ctx, &err),
    }
}
