//! Explicit authentication context.
//!
//! The identity provider is an external collaborator; all the core needs
//! from it is "is there a usable session, and whose is it". The context is
//! handed to whatever needs it (the HTTP client, the action boundaries)
//! instead of being looked up from a global.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskKind};

/// Bearer credential issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

pub trait AuthContext {
    /// The current, unexpired session, if any.
    fn session(&self) -> Option<Session>;

    fn user_id(&self) -> Option<String> {
        self.session().map(|s| s.user_id)
    }

    fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }
}

impl<A: AuthContext + ?Sized> AuthContext for &A {
    fn session(&self) -> Option<Session> {
        (**self).session()
    }
}

impl<A: AuthContext + ?Sized> AuthContext for Box<A> {
    fn session(&self) -> Option<Session> {
        (**self).session()
    }
}

/// A session fixed at construction (token from a flag, env var or config).
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    session: Option<Session>,
}

impl StaticAuth {
    #[must_use]
    pub const fn new(session: Option<Session>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::new(Some(Session {
            access_token: token.into(),
            user_id: user_id.into(),
            expires_at: None,
        }))
    }
}

impl AuthContext for StaticAuth {
    fn session(&self) -> Option<Session> {
        self.session
            .as_ref()
            .filter(|s| !s.is_expired_at(Utc::now()))
            .cloned()
    }
}

/// No credential at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl AuthContext for Anonymous {
    fn session(&self) -> Option<Session> {
        None
    }
}

/// What a viewer may do on a task. A missing session disables everything;
/// it is not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub can_vote: bool,
    pub can_fund: bool,
    pub can_submit: bool,
}

impl Permissions {
    #[must_use]
    pub fn for_task(viewer: Option<&str>, task: &Task) -> Self {
        let Some(viewer) = viewer else {
            return Self::default();
        };
        if !task.status.is_open() {
            return Self::default();
        }

        let owner = task.is_owned_by(viewer);
        match task.kind {
            TaskKind::Community => Self {
                can_vote: true,
                can_fund: true,
                can_submit: !owner,
            },
            TaskKind::Personal => Self {
                can_vote: owner,
                can_fund: owner,
                can_submit: !owner,
            },
        }
    }
}
