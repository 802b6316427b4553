//! [`Renderable`] impls for the core types the commands print.

use serde::Serialize;
use solvr_core::auth::Permissions;
use solvr_core::model::{Solution, Submission, Task};
use std::io::{self, Write};

use crate::output::{Renderable, pretty_kv, pretty_rule, pretty_section};

fn json_line<T: Serialize>(w: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *w, value).map_err(io::Error::other)
}

/// First line of `text`, cut to `max` chars.
fn excerpt(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}

impl Renderable for Task {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}  {}", self.id, self.title)?;
        writeln!(
            w,
            "    {} · {} · funds {} · votes {} · by {}",
            self.kind, self.status, self.metrics.total_funds, self.metrics.total_votes, self.created_by
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        json_line(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.id, self.kind, self.status, self.metrics.total_funds, self.metrics.total_votes, self.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "KIND", "STATUS", "FUNDS", "VOTES", "TITLE"]
    }
}

impl Renderable for Solution {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {} votes  by {}",
            self.id, self.total_votes, self.created_by
        )?;
        writeln!(w, "    {}", excerpt(&self.content, 66))
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        json_line(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.id,
            self.total_votes,
            self.created_by,
            excerpt(&self.content, 60)
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "VOTES", "AUTHOR", "CONTENT"]
    }
}

impl Renderable for Submission {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}  on {} ({})", self.id, self.task_title, self.task_id)?;
        writeln!(
            w,
            "    {} votes · {}",
            self.total_votes,
            excerpt(&self.content, 56)
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        json_line(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.id,
            self.task_id,
            self.total_votes,
            excerpt(&self.content, 60)
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "TASK", "VOTES", "CONTENT"]
    }
}

/// `solvr task <id>`: the task plus what the viewer may do on it.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    pub task: Task,
    pub permissions: Permissions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting_rights: Option<u64>,
}

impl Renderable for TaskDetail {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let task = &self.task;
        pretty_section(w, &task.title)?;
        pretty_kv(w, "ID", &task.id)?;
        pretty_kv(w, "Kind", task.kind.to_string())?;
        pretty_kv(w, "Status", task.status.to_string())?;
        pretty_kv(w, "Owner", &task.created_by)?;
        pretty_kv(w, "Created", task.created_at.format("%Y-%m-%d %H:%M UTC").to_string())?;
        if let Some(deadline) = task.deadline {
            pretty_kv(w, "Deadline", deadline.format("%Y-%m-%d %H:%M UTC").to_string())?;
        }
        pretty_kv(w, "Funds", task.metrics.total_funds.to_string())?;
        pretty_kv(w, "Votes", task.metrics.total_votes.to_string())?;
        if let Some(rights) = self.voting_rights {
            pretty_kv(w, "Your rights", rights.to_string())?;
        }
        let allowed: Vec<&str> = [
            (self.permissions.can_vote, "vote"),
            (self.permissions.can_fund, "fund"),
            (self.permissions.can_submit, "submit"),
        ]
        .into_iter()
        .filter_map(|(ok, name)| ok.then_some(name))
        .collect();
        pretty_kv(
            w,
            "You can",
            if allowed.is_empty() {
                "view only".to_string()
            } else {
                allowed.join(", ")
            },
        )?;
        pretty_rule(w)?;
        writeln!(w, "{}", task.description)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        json_line(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let task = &self.task;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            task.id,
            task.kind,
            task.status,
            task.metrics.total_funds,
            self.voting_rights
                .map_or_else(|| "-".to_string(), |r| r.to_string()),
            task.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "KIND", "STATUS", "FUNDS", "RIGHTS", "TITLE"]
    }
}
