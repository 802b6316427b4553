//! Paginated list reconciliation.
//!
//! [`reduce`] is the pure transition `(ListState, ListEvent) -> ListState`;
//! [`PagedList`] wraps it with the loading/error flags, the active filter
//! and the fetch generation that discards stale results.
//!
//! Merge rule for an arriving page: every existing entity whose id occurs
//! in the page is dropped, then the page is appended in server order. An
//! entity that reappears on a later page therefore moves to its new
//! position. Server order within a page is never re-sorted.

mod paged;

pub use paged::{FetchKind, FetchOutcome, FetchTicket, PageSource, PagedList};

use std::collections::HashSet;

use crate::model::{Entity, Page, Pagination};

/// Locally cached, id-unique, arrival-ordered list plus its last cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState<T> {
    pub data: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            pagination: None,
        }
    }
}

impl<T: Entity> ListState<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.data.iter().find(|e| e.id() == id)
    }

    /// The cursor to fetch next, if the server reported one.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.pagination.and_then(|p| p.next_page)
    }

    /// Entities passing `keep`, in list order. Render-time filtering (e.g.
    /// hiding deleted tasks) goes through here; the list itself keeps them.
    pub fn visible<'a>(&'a self, keep: impl Fn(&T) -> bool + 'a) -> impl Iterator<Item = &'a T> {
        self.data.iter().filter(move |e| keep(*e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent<T> {
    /// A server page arrived for the current filter.
    PageLoaded(Page<T>),
    /// A locally created entity, shown before any refetch.
    LocalInsert(T),
    /// The filter changed; start over.
    FilterChanged,
    /// A fresher copy of an entity already in the list (e.g. after funding).
    Replaced(T),
}

/// Apply one event.
#[must_use]
pub fn reduce<T: Entity>(mut state: ListState<T>, event: ListEvent<T>) -> ListState<T> {
    match event {
        ListEvent::PageLoaded(page) => {
            let incoming = dedup_page(page.data);
            let ids: HashSet<&str> = incoming.iter().map(Entity::id).collect();
            state.data.retain(|e| !ids.contains(e.id()));
            state.data.extend(incoming);
            state.pagination = Some(page.pagination);
        }
        ListEvent::LocalInsert(entity) => {
            state.data.retain(|e| e.id() != entity.id());
            state.data.insert(0, entity);
        }
        ListEvent::FilterChanged => {
            state.data.clear();
            state.pagination = None;
        }
        ListEvent::Replaced(entity) => {
            if let Some(slot) = state.data.iter_mut().find(|e| e.id() == entity.id()) {
                *slot = entity;
            }
        }
    }
    state
}

/// A page repeating an id keeps the first occurrence.
fn dedup_page<T: Entity>(data: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    data.into_iter()
        .filter(|e| seen.insert(e.id().to_string()))
        .collect()
}
