//! REST API collaborator.
//!
//! [`TaskApi`] is the seam between the state machines and the network:
//! the reconciler and the ledger only ever see its results, and tests plug
//! in an in-memory implementation.

pub mod http;

pub use http::HttpApi;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::model::{Envelope, Page, Pagination, Solution, Submission, Task, TaskKind, TaskStatus};
use crate::validate::{NewSolution, NewTask};

/// Errors surfaced by API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure: DNS, connect, TLS, reset.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Non-2xx HTTP status.
    #[error("server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// `success: false` in an otherwise well-formed response.
    #[error("{message}")]
    Business { message: String },

    /// Response body did not match the expected shape.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The call needs a session and none is available.
    #[error("not signed in")]
    Unauthenticated,
}

impl ApiError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::TransportFailed,
            Self::Status { status: 401, .. } | Self::Unauthenticated => ErrorCode::Unauthenticated,
            Self::Status { status: 404, .. } => ErrorCode::TaskNotFound,
            Self::Status { .. } | Self::Business { .. } => ErrorCode::ServerRejected,
            Self::Decode { .. } => ErrorCode::DecodeFailed,
        }
    }
}

/// Filter parameters for the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub kind: Option<TaskKind>,
}

/// Server-reported voting position of the viewer on one task.
///
/// `voting_rights: None` means the viewer has no voting relationship with
/// the task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoteMetrics {
    #[serde(default)]
    pub voting_rights: Option<u64>,
    #[serde(default)]
    pub total_votes: u64,
    #[serde(default)]
    pub voted_solution_ids: Vec<String>,
}

/// Authoritative figures returned after a vote is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteMetrics {
    pub voting_rights: u64,
    #[serde(default)]
    pub total_votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub user_vote_metrics: VoteMetrics,
    #[serde(default)]
    pub top_solutions: Vec<Solution>,
}

pub trait TaskApi {
    fn list_tasks(&self, filter: &TaskFilter, page: u32) -> Result<Page<Task>, ApiError>;

    fn list_solutions(&self, task_id: &str, page: u32) -> Result<Page<Solution>, ApiError>;

    /// The viewer's own solutions. Requires a session.
    fn list_submissions(&self, page: u32) -> Result<Page<Submission>, ApiError>;

    fn get_task(&self, task_id: &str) -> Result<Task, ApiError>;

    fn voting_metrics(&self, task_id: &str) -> Result<UserVoteMetrics, ApiError>;

    fn create_task(&self, task: &NewTask) -> Result<Task, ApiError>;

    fn create_solution(&self, task_id: &str, solution: &NewSolution)
    -> Result<Solution, ApiError>;

    fn vote(&self, solution_id: &str, amount: u64) -> Result<VoteReceipt, ApiError>;

    fn fund(&self, task_id: &str, amount: u64) -> Result<Task, ApiError>;

    fn username_available(&self, username: &str) -> Result<bool, ApiError>;
}

/// Unwrap a single-entity envelope.
pub(crate) fn into_data<T>(envelope: Envelope<T>, url: &str) -> Result<T, ApiError> {
    if !envelope.success {
        return Err(business(envelope.message));
    }
    envelope.data.ok_or_else(|| ApiError::Decode {
        url: url.to_string(),
        message: "response has no data".to_string(),
    })
}

/// Unwrap a list envelope. A list response without a pagination block is
/// treated as the only page.
pub(crate) fn into_page<T>(
    envelope: Envelope<Vec<T>>,
    requested: u32,
) -> Result<Page<T>, ApiError> {
    if !envelope.success {
        return Err(business(envelope.message));
    }
    let pagination = envelope
        .pagination
        .unwrap_or_else(|| Pagination::single(requested, None));
    Ok(Page::new(envelope.data.unwrap_or_default(), pagination))
}

fn business(message: Option<String>) -> ApiError {
    ApiError::Business {
        message: message.unwrap_or_else(|| "request was rejected".to_string()),
    }
}
