use serde::{Deserialize, Serialize};

/// Server-supplied pagination cursor. `next_page: None` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_records: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl Pagination {
    /// Whether the server reported no further pages.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.next_page.is_none()
    }

    /// Descriptor for a single, complete page (handy for fixtures).
    #[must_use]
    pub const fn single(current_page: u32, next_page: Option<u32>) -> Self {
        Self {
            total_records: 0,
            total_pages: 0,
            current_page,
            prev_page: if current_page > 1 {
                Some(current_page - 1)
            } else {
                None
            },
            next_page,
        }
    }
}

/// A batch of entities plus the cursor describing where it sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self { data, pagination }
    }
}

/// Response wrapper used by every API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

const fn default_true() -> bool {
    true
}
