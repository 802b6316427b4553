use tracing::{debug, warn};

use super::{ListEvent, ListState, reduce};
use crate::api::ApiError;
use crate::model::{Entity, Page};
use crate::notify::{Notice, NoticeSink};

/// Fetches one page of a collection for a filter.
///
/// Any `FnMut(&F, u32) -> Result<Page<T>, ApiError>` is a source, so call
/// sites can close over a [`crate::api::TaskApi`] directly.
pub trait PageSource<T, F> {
    fn fetch(&mut self, filter: &F, page: u32) -> Result<Page<T>, ApiError>;
}

impl<T, F, G> PageSource<T, F> for G
where
    G: FnMut(&F, u32) -> Result<Page<T>, ApiError>,
{
    fn fetch(&mut self, filter: &F, page: u32) -> Result<Page<T>, ApiError> {
        self(filter, page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Page 1 after a reset.
    Initial,
    /// A later page following the server cursor.
    Next,
}

/// Identifies one issued fetch. Only the ticket of the current generation
/// that is still in flight may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    page: u32,
    kind: FetchKind,
}

impl FetchTicket {
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn kind(&self) -> FetchKind {
        self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was merged into the list.
    Applied,
    /// The fetch failed; prior data kept, a notice was emitted.
    Failed,
    /// The result belonged to a torn-down or superseded fetch and was dropped.
    Discarded,
    /// Nothing to fetch (terminal cursor, or a fetch already in flight).
    Skipped,
}

/// A reconciled list bound to one filter and one owner.
#[derive(Debug, Clone)]
pub struct PagedList<T, F> {
    label: &'static str,
    state: ListState<T>,
    filter: F,
    loading: bool,
    error: bool,
    loaded_page: u32,
    generation: u64,
    in_flight: Option<FetchTicket>,
}

impl<T: Entity, F> PagedList<T, F> {
    /// `label` names the collection in logs and notices ("tasks").
    pub fn new(label: &'static str, filter: F) -> Self {
        Self {
            label,
            state: ListState::default(),
            filter,
            loading: false,
            error: false,
            loaded_page: 0,
            generation: 0,
            in_flight: None,
        }
    }

    pub const fn state(&self) -> &ListState<T> {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        &self.state.data
    }

    pub const fn filter(&self) -> &F {
        &self.filter
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set when the first page failed; the view shows its static error.
    pub const fn has_error(&self) -> bool {
        self.error
    }

    /// The last page number merged, 0 before any.
    pub const fn loaded_page(&self) -> u32 {
        self.loaded_page
    }

    /// Whether a further page can be requested right now.
    pub fn has_more(&self) -> bool {
        self.in_flight.is_none()
            && self
                .state
                .next_page()
                .is_some_and(|next| next != self.loaded_page)
    }

    /// Start over at page 1 for the current filter. Any fetch still in
    /// flight becomes stale.
    pub fn begin_initialize(&mut self) -> FetchTicket {
        self.generation += 1;
        self.apply(ListEvent::FilterChanged);
        self.loaded_page = 0;
        self.loading = true;
        self.error = false;
        let ticket = FetchTicket {
            generation: self.generation,
            page: 1,
            kind: FetchKind::Initial,
        };
        self.in_flight = Some(ticket);
        debug!(list = self.label, generation = self.generation, "fetching page 1");
        ticket
    }

    /// Issue the fetch for the server's next page, or `None` when there is
    /// nothing to fetch.
    pub fn begin_next_page(&mut self) -> Option<FetchTicket> {
        if !self.has_more() {
            return None;
        }
        let page = self.state.next_page()?;
        self.loading = true;
        let ticket = FetchTicket {
            generation: self.generation,
            page,
            kind: FetchKind::Next,
        };
        self.in_flight = Some(ticket);
        debug!(list = self.label, page, "fetching next page");
        Some(ticket)
    }

    /// Commit a fetch result. Stale tickets are dropped without touching
    /// any state.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<T>, ApiError>,
        sink: &mut dyn NoticeSink,
    ) -> FetchOutcome {
        if self.in_flight != Some(ticket) {
            debug!(
                list = self.label,
                page = ticket.page,
                "discarding result of superseded fetch"
            );
            return FetchOutcome::Discarded;
        }

        self.in_flight = None;
        self.loading = false;
        match result {
            Ok(page) => {
                self.loaded_page = ticket.page;
                self.error = false;
                self.apply(ListEvent::PageLoaded(page));
                debug!(
                    list = self.label,
                    page = ticket.page,
                    len = self.state.len(),
                    "page merged"
                );
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!(list = self.label, page = ticket.page, error = %err, "page fetch failed");
                if ticket.kind == FetchKind::Initial {
                    self.error = true;
                }
                sink.notify(Notice::error(format!("Could not load {}: {err}", self.label)));
                FetchOutcome::Failed
            }
        }
    }

    /// Reset and load page 1 through `source`.
    pub fn initialize(
        &mut self,
        source: &mut impl PageSource<T, F>,
        sink: &mut dyn NoticeSink,
    ) -> FetchOutcome {
        let ticket = self.begin_initialize();
        let result = source.fetch(&self.filter, ticket.page);
        self.complete(ticket, result, sink)
    }

    /// Load the server's next page through `source`. Does not call the
    /// source at all when there is nothing to fetch.
    pub fn load_next_page(
        &mut self,
        source: &mut impl PageSource<T, F>,
        sink: &mut dyn NoticeSink,
    ) -> FetchOutcome {
        let Some(ticket) = self.begin_next_page() else {
            return FetchOutcome::Skipped;
        };
        let result = source.fetch(&self.filter, ticket.page);
        self.complete(ticket, result, sink)
    }

    /// Switch filter: clear, invalidate in-flight fetches, return the
    /// page 1 ticket for the new filter.
    pub fn begin_set_filter(&mut self, filter: F) -> FetchTicket {
        self.filter = filter;
        self.begin_initialize()
    }

    pub fn set_filter(
        &mut self,
        filter: F,
        source: &mut impl PageSource<T, F>,
        sink: &mut dyn NoticeSink,
    ) -> FetchOutcome {
        let ticket = self.begin_set_filter(filter);
        let result = source.fetch(&self.filter, ticket.page);
        self.complete(ticket, result, sink)
    }

    /// Show a just-created entity at the head of the list.
    pub fn insert_local(&mut self, entity: T) {
        self.apply(ListEvent::LocalInsert(entity));
    }

    /// Swap in a fresher copy of an entity already listed.
    pub fn replace(&mut self, entity: T) {
        self.apply(ListEvent::Replaced(entity));
    }

    /// The owner is going away: nothing resolving later may apply.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.loading = false;
    }

    fn apply(&mut self, event: ListEvent<T>) {
        self.state = reduce(std::mem::take(&mut self.state), event);
    }
}
