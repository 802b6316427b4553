//! `ureq`-backed [`TaskApi`] implementation.

use percent_encoding::{AsciiSet, CONTROLS, PercentEncode, utf8_percent_encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    ApiError, TaskApi, TaskFilter, UserVoteMetrics, VoteReceipt, into_data, into_page,
};
use crate::auth::AuthContext;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::model::{Envelope, Page, Solution, Submission, Task};
use crate::validate::{NewSolution, NewTask};

const USER_AGENT: &str = concat!("solvr/", env!("CARGO_PKG_VERSION"));

/// Bytes that cannot appear raw inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// An id escaped for use as a single path segment.
fn segment(id: &str) -> PercentEncode<'_> {
    utf8_percent_encode(id, SEGMENT)
}

/// Blocking HTTP client for the solvr REST API.
pub struct HttpApi<A: AuthContext> {
    base_url: String,
    agent: ureq::Agent,
    auth: A,
    page_size: u32,
}

impl<A: AuthContext> HttpApi<A> {
    pub fn new(base_url: &str, auth: A, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
            auth,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Rows requested per list page.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub const fn auth(&self) -> &A {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn page_query(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![("page", page.to_string()), ("limit", self.page_size.to_string())]
    }

    /// Attach the bearer credential when a session exists. When `required`,
    /// a missing session fails before anything is sent.
    fn authorize(&self, request: ureq::Request, required: bool) -> Result<ureq::Request, ApiError> {
        match self.auth.session() {
            Some(session) => {
                Ok(request.set("Authorization", &format!("Bearer {}", session.access_token)))
            }
            None if required => Err(ApiError::Unauthenticated),
            None => Ok(request),
        }
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        required: bool,
    ) -> Result<Envelope<T>, ApiError> {
        let url = self.url(path);
        let mut request = self.agent.get(&url).set("Accept", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }
        let request = self.authorize(request, required)?;
        debug!(%url, "GET");
        decode(&url, request.call())
    }

    fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Serialize,
    ) -> Result<Envelope<T>, ApiError> {
        let url = self.url(path);
        let request = self.agent.post(&url).set("Accept", "application/json");
        let request = self.authorize(request, true)?;
        debug!(%url, "POST");
        decode(&url, request.send_json(body))
    }
}

fn decode<T: DeserializeOwned>(
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<Envelope<T>, ApiError> {
    match result {
        Ok(response) => response
            .into_json::<Envelope<T>>()
            .map_err(|err| ApiError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }),
        Err(ureq::Error::Status(status, response)) => {
            // Error bodies usually still carry the envelope's message.
            let message = response
                .into_json::<Envelope<serde_json::Value>>()
                .ok()
                .and_then(|env| env.message)
                .unwrap_or_else(|| "no message".to_string());
            warn!(%url, status, %message, "request rejected");
            Err(ApiError::Status { status, message })
        }
        Err(ureq::Error::Transport(transport)) => {
            warn!(%url, error = %transport, "transport failure");
            Err(ApiError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            })
        }
    }
}

impl<A: AuthContext> TaskApi for HttpApi<A> {
    fn list_tasks(&self, filter: &TaskFilter, page: u32) -> Result<Page<Task>, ApiError> {
        let mut query = self.page_query(page);
        if let Some(status) = filter.status {
            query.push(("status", status.to_string()));
        }
        if let Some(kind) = filter.kind {
            query.push(("kind", kind.to_string()));
        }
        into_page(self.get("/tasks", &query, false)?, page)
    }

    fn list_solutions(&self, task_id: &str, page: u32) -> Result<Page<Solution>, ApiError> {
        let path = format!("/tasks/{}/solutions", segment(task_id));
        into_page(self.get(&path, &self.page_query(page), false)?, page)
    }

    fn list_submissions(&self, page: u32) -> Result<Page<Submission>, ApiError> {
        into_page(
            self.get("/submissions", &self.page_query(page), true)?,
            page,
        )
    }

    fn get_task(&self, task_id: &str) -> Result<Task, ApiError> {
        let path = format!("/tasks/{}", segment(task_id));
        into_data(self.get(&path, &[], false)?, &self.url(&path))
    }

    fn voting_metrics(&self, task_id: &str) -> Result<UserVoteMetrics, ApiError> {
        if !self.auth.is_authenticated() {
            return Ok(UserVoteMetrics::default());
        }
        let path = format!("/tasks/{}/metrics", segment(task_id));
        into_data(self.get(&path, &[], true)?, &self.url(&path))
    }

    fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        into_data(self.post("/tasks", task)?, &self.url("/tasks"))
    }

    fn create_solution(
        &self,
        task_id: &str,
        solution: &NewSolution,
    ) -> Result<Solution, ApiError> {
        let path = format!("/tasks/{}/solutions", segment(task_id));
        into_data(self.post(&path, solution)?, &self.url(&path))
    }

    fn vote(&self, solution_id: &str, amount: u64) -> Result<VoteReceipt, ApiError> {
        let path = format!("/solutions/{}/vote", segment(solution_id));
        into_data(
            self.post(&path, json!({ "amount": amount }))?,
            &self.url(&path),
        )
    }

    fn fund(&self, task_id: &str, amount: u64) -> Result<Task, ApiError> {
        let path = format!("/tasks/{}/fund", segment(task_id));
        into_data(
            self.post(&path, json!({ "amount": amount }))?,
            &self.url(&path),
        )
    }

    fn username_available(&self, username: &str) -> Result<bool, ApiError> {
        #[derive(serde::Deserialize)]
        struct Availability {
            available: bool,
        }

        let path = "/users/available";
        let env: Envelope<Availability> =
            self.get(path, &[("username", username.to_string())], false)?;
        into_data(env, &self.url(path)).map(|a| a.available)
    }
}
