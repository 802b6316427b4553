//! In-memory `TaskApi` shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use chrono::Utc;
use solvr_core::api::{ApiError, TaskApi, TaskFilter, UserVoteMetrics, VoteMetrics, VoteReceipt};
use solvr_core::model::{Page, Solution, Submission, Task, TaskMetrics, TaskStatus};
use solvr_core::validate::{NewSolution, NewTask};

#[derive(Default)]
pub struct FakeApi {
    pub solution_pages: RefCell<VecDeque<Result<Page<Solution>, ApiError>>>,
    pub task_pages: RefCell<VecDeque<Result<Page<Task>, ApiError>>>,
    pub tasks: RefCell<Vec<Task>>,
    pub metrics: RefCell<UserVoteMetrics>,
    pub vote_results: RefCell<VecDeque<Result<u64, ApiError>>>,
    pub fund_result: RefCell<Option<Result<Task, ApiError>>>,
    pub list_calls: Cell<usize>,
    pub vote_calls: Cell<usize>,
    pub mutate_calls: Cell<usize>,
}

pub fn transport_error() -> ApiError {
    ApiError::Transport {
        url: "http://fake/api".to_string(),
        message: "connection reset by peer".to_string(),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_solutions(&self, page: Result<Page<Solution>, ApiError>) {
        self.solution_pages.borrow_mut().push_back(page);
    }

    pub fn push_tasks(&self, page: Result<Page<Task>, ApiError>) {
        self.task_pages.borrow_mut().push_back(page);
    }

    /// Queue the server's `votingRights` for the next vote, or a rejection.
    pub fn push_vote(&self, result: Result<u64, ApiError>) {
        self.vote_results.borrow_mut().push_back(result);
    }

    fn next<T>(queue: &RefCell<VecDeque<Result<T, ApiError>>>) -> Result<T, ApiError> {
        queue
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(transport_error()))
    }
}

impl TaskApi for FakeApi {
    fn list_tasks(&self, _filter: &TaskFilter, _page: u32) -> Result<Page<Task>, ApiError> {
        self.list_calls.set(self.list_calls.get() + 1);
        Self::next(&self.task_pages)
    }

    fn list_solutions(&self, _task_id: &str, _page: u32) -> Result<Page<Solution>, ApiError> {
        self.list_calls.set(self.list_calls.get() + 1);
        Self::next(&self.solution_pages)
    }

    fn list_submissions(&self, _page: u32) -> Result<Page<Submission>, ApiError> {
        Err(ApiError::Unauthenticated)
    }

    fn get_task(&self, task_id: &str) -> Result<Task, ApiError> {
        self.tasks
            .borrow()
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: "task not found".to_string(),
            })
    }

    fn voting_metrics(&self, _task_id: &str) -> Result<UserVoteMetrics, ApiError> {
        Ok(self.metrics.borrow().clone())
    }

    fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.mutate_calls.set(self.mutate_calls.get() + 1);
        Ok(Task {
            id: "t-new".to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            kind: task.kind,
            status: TaskStatus::Active,
            created_at: Utc::now(),
            created_by: "me".to_string(),
            deadline: task.deadline,
            metrics: TaskMetrics::default(),
        })
    }

    fn create_solution(&self, task_id: &str, solution: &NewSolution) -> Result<Solution, ApiError> {
        self.mutate_calls.set(self.mutate_calls.get() + 1);
        Ok(Solution {
            id: "s-new".to_string(),
            task_id: task_id.to_string(),
            content: solution.content.clone(),
            created_at: Utc::now(),
            created_by: "me".to_string(),
            total_votes: 0,
        })
    }

    fn vote(&self, _solution_id: &str, _amount: u64) -> Result<VoteReceipt, ApiError> {
        self.vote_calls.set(self.vote_calls.get() + 1);
        Self::next(&self.vote_results).map(|rights| VoteReceipt {
            user_vote_metrics: VoteMetrics {
                voting_rights: rights,
                total_votes: 0,
            },
            top_solutions: Vec::new(),
        })
    }

    fn fund(&self, _task_id: &str, _amount: u64) -> Result<Task, ApiError> {
        self.mutate_calls.set(self.mutate_calls.get() + 1);
        self.fund_result
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Err(transport_error()))
    }

    fn username_available(&self, username: &str) -> Result<bool, ApiError> {
        Ok(username != "taken")
    }
}
