use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

/// A proposed answer to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub id: String,
    pub task_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub total_votes: u64,
}

impl Entity for Solution {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One of the viewer's own solutions, as listed under "my submissions".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub task_id: String,
    #[serde(default)]
    pub task_title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub total_votes: u64,
}

impl Entity for Submission {
    fn id(&self) -> &str {
        &self.id
    }
}
