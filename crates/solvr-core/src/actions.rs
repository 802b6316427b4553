//! Action boundaries: vote, fund, submit, create.
//!
//! Each action checks the session, validates input, calls the API, and only
//! then mutates local state. Every path ends in exactly one [`Notice`].
//! Nothing here returns `Err`: a failed action is an outcome the caller
//! renders, and the list or ledger it targeted is left as it was.

use tracing::{info, warn};

use crate::api::{ApiError, TaskApi, VoteReceipt};
use crate::auth::{AuthContext, Permissions};
use crate::error::ErrorCode;
use crate::ledger::{LedgerError, VotingLedger};
use crate::model::{Solution, Task};
use crate::notify::{Notice, NoticeSink};
use crate::reconcile::PagedList;
use crate::validate::{FundDraft, SolutionDraft, TaskDraft, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    Done(T),
    /// The control should be disabled: no session, or not allowed here.
    Disabled(ErrorCode),
    /// Input failed its schema; nothing was sent.
    Invalid(ValidationError),
    /// Vote amount failed the ledger preconditions; nothing was sent.
    Refused(LedgerError),
    /// Transport or server rejected the call; local state unchanged.
    Failed(ApiError),
}

impl<T> ActionOutcome<T> {
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// `None` for `Done`.
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Done(_) => None,
            Self::Disabled(code) => Some(*code),
            Self::Invalid(_) => Some(ErrorCode::ValidationFailed),
            Self::Refused(err) => Some(err.code()),
            Self::Failed(err) => Some(err.code()),
        }
    }
}

fn disabled<T>(sink: &mut dyn NoticeSink, code: ErrorCode) -> ActionOutcome<T> {
    sink.notify(Notice::info(code.message()));
    ActionOutcome::Disabled(code)
}

fn invalid<T>(sink: &mut dyn NoticeSink, err: ValidationError) -> ActionOutcome<T> {
    sink.notify(Notice::error(format!("{err} ({})", err.suggestion())));
    ActionOutcome::Invalid(err)
}

fn failed<T>(sink: &mut dyn NoticeSink, what: &str, err: ApiError) -> ActionOutcome<T> {
    warn!(action = what, error = %err, "action failed");
    sink.notify(Notice::error(format!("Could not {what}: {err}")));
    ActionOutcome::Failed(err)
}

/// Vote `amount` rights on `solution`.
pub fn submit_vote(
    auth: &impl AuthContext,
    api: &impl TaskApi,
    sink: &mut dyn NoticeSink,
    ledger: &mut VotingLedger,
    solution: &Solution,
    amount: u64,
) -> ActionOutcome<VoteReceipt> {
    let viewer = auth.user_id();
    if let Some(block) = ledger.check_vote(&solution.id, &solution.created_by, viewer.as_deref()) {
        return disabled(sink, block.code());
    }

    let request = match ledger.prepare_vote(&solution.id, amount) {
        Ok(request) => request,
        Err(err) => {
            sink.notify(Notice::error(err.to_string()));
            return ActionOutcome::Refused(err);
        }
    };

    match ledger.cast_vote(api, &request) {
        Ok(receipt) => {
            sink.notify(Notice::success(format!(
                "Voted {amount} on solution {}; {} rights left",
                solution.id, receipt.user_vote_metrics.voting_rights
            )));
            ActionOutcome::Done(receipt)
        }
        Err(LedgerError::Api(err)) => failed(sink, "vote", err),
        Err(err) => {
            sink.notify(Notice::error(err.to_string()));
            ActionOutcome::Refused(err)
        }
    }
}

/// Add funds to `task`; the server's updated copy replaces the listed one.
pub fn fund_task<F>(
    auth: &impl AuthContext,
    api: &impl TaskApi,
    sink: &mut dyn NoticeSink,
    list: &mut PagedList<Task, F>,
    task: &Task,
    draft: &FundDraft,
) -> ActionOutcome<Task> {
    let Some(viewer) = auth.user_id() else {
        return disabled(sink, ErrorCode::Unauthenticated);
    };
    let amount = match draft.validate() {
        Ok(amount) => amount,
        Err(err) => return invalid(sink, err),
    };
    if !Permissions::for_task(Some(&viewer), task).can_fund {
        return disabled(sink, ErrorCode::NotPermitted);
    }

    match api.fund(&task.id, amount) {
        Ok(updated) => {
            info!(task_id = %task.id, amount, "task funded");
            list.replace(updated.clone());
            sink.notify(Notice::success(format!("Funded {amount} to \"{}\"", updated.title)));
            ActionOutcome::Done(updated)
        }
        Err(err) => failed(sink, "fund task", err),
    }
}

/// Post a solution to `task` and show it at the head of `list`.
pub fn submit_solution<F>(
    auth: &impl AuthContext,
    api: &impl TaskApi,
    sink: &mut dyn NoticeSink,
    list: &mut PagedList<Solution, F>,
    task: &Task,
    draft: &SolutionDraft,
) -> ActionOutcome<Solution> {
    let Some(viewer) = auth.user_id() else {
        return disabled(sink, ErrorCode::Unauthenticated);
    };
    let payload = match draft.validate() {
        Ok(payload) => payload,
        Err(err) => return invalid(sink, err),
    };
    if !Permissions::for_task(Some(&viewer), task).can_submit {
        return disabled(sink, ErrorCode::NotPermitted);
    }

    match api.create_solution(&task.id, &payload) {
        Ok(solution) => {
            info!(task_id = %task.id, solution_id = %solution.id, "solution submitted");
            list.insert_local(solution.clone());
            sink.notify(Notice::success("Solution submitted"));
            ActionOutcome::Done(solution)
        }
        Err(err) => failed(sink, "submit solution", err),
    }
}

/// Create a task and show it at the head of `list`.
pub fn create_task<F>(
    auth: &impl AuthContext,
    api: &impl TaskApi,
    sink: &mut dyn NoticeSink,
    list: &mut PagedList<Task, F>,
    draft: &TaskDraft,
) -> ActionOutcome<Task> {
    if !auth.is_authenticated() {
        return disabled(sink, ErrorCode::Unauthenticated);
    }
    let payload = match draft.validate() {
        Ok(payload) => payload,
        Err(err) => return invalid(sink, err),
    };

    match api.create_task(&payload) {
        Ok(task) => {
            info!(task_id = %task.id, kind = %task.kind, "task created");
            list.insert_local(task.clone());
            sink.notify(Notice::success(format!("Created task \"{}\"", task.title)));
            ActionOutcome::Done(task)
        }
        Err(err) => failed(sink, "create task", err),
    }
}
