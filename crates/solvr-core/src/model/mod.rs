pub mod page;
pub mod solution;
pub mod task;

pub use page::{Envelope, Page, Pagination};
pub use solution::{Solution, Submission};
pub use task::{Task, TaskKind, TaskMetrics, TaskStatus};

use std::fmt;

/// Anything kept in a reconciled list: identified by an opaque id that is
/// unique within its collection.
pub trait Entity {
    fn id(&self) -> &str;
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}
