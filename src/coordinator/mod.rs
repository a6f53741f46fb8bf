//! Searchable list coordinator
//!
//! Mediates between a stream of UI intents and a paged, searchable source.
//! The coordinator itself is a plain state machine: intents and fetch
//! completions go in, [`Effect`]s come out (issue a fetch, cancel one, emit a
//! one-shot event, report a selection). The async driver in [`runtime`]
//! performs those effects and feeds completions back.
//!
//! # Request lifecycle
//!
//! ```text
//! request_initial_load / refresh ──→ page 1 ──→ (latest list) ──→ final state
//! near_end_of_list / load_more   ──→ page N+1 ──→ append
//! set_query                      ──→ cancel pending, remember query
//! ```
//!
//! At most one request is pending at any time. Every request carries a
//! [`Ticket`]; a completion whose ticket is not the pending one belongs to a
//! superseded request and is dropped without touching state.

use crate::model::{ErrorReason, ListEvent, ListItem, ListSnapshot, ListState, Page};
use crate::source::FetchError;

pub mod runtime;

#[cfg(test)]
mod tests;

pub use runtime::{CoordinatorBuilder, ListHandle, SelectionDelegate};

/// Pages are numbered from 1
pub const FIRST_PAGE: u32 = 1;

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Identity of one issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What a fetch should ask the source for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Page {
        page: u32,
        page_size: u32,
        query: String,
    },
    Latest,
}

/// Result of a fetch, delivered back to the coordinator with its ticket
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Page(Result<Page<T>, FetchError>),
    Latest(Result<Vec<T>, FetchError>),
}

/// Side effects requested by the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<Id> {
    Fetch { ticket: Ticket, request: FetchRequest },
    Cancel(Ticket),
    Emit(ListEvent),
    Select(Id),
}

/// User intents accepted by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    InitialLoad,
    Refresh,
    /// The row at this index became visible
    NearEndOfList(usize),
    LoadMore,
    SetQuery(String),
    SelectItem(usize),
    SelectLatest(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    /// Page 1 of an initial load or refresh
    Initial,
    /// The "latest" list fetched after page 1
    Latest,
    /// Next page of pagination
    More,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: Ticket,
    kind: RequestKind,
}

/// State machine behind a paginated, searchable list
pub struct SearchableListCoordinator<T: ListItem> {
    page_size: u32,
    state: ListState,
    primary: Vec<T>,
    secondary: Vec<T>,
    current_page: u32,
    total_pages: Option<u32>,
    query: String,
    pending: Option<Pending>,
    next_ticket: u64,
    effects: Vec<Effect<T::Id>>,
}

impl<T: ListItem> SearchableListCoordinator<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            state: ListState::Loading,
            primary: Vec::new(),
            secondary: Vec::new(),
            current_page: 0,
            total_pages: None,
            query: String::new(),
            pending: None,
            next_ticket: 1,
            effects: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Intents
    // ─────────────────────────────────────────────────────────────────────

    pub fn handle(&mut self, intent: Intent) {
        match intent {
            Intent::InitialLoad => self.request_initial_load(),
            Intent::Refresh => self.refresh(),
            Intent::NearEndOfList(index) => self.near_end_of_list(index),
            Intent::LoadMore => self.load_more_explicit(),
            Intent::SetQuery(text) => self.set_query(text),
            Intent::SelectItem(index) => self.select_item(index),
            Intent::SelectLatest(index) => self.select_secondary_item(index),
        }
    }

    /// Show the loading state and fetch page 1 for the active query
    pub fn request_initial_load(&mut self) {
        if self.pending.is_some() {
            tracing::debug!("Initial load ignored: request already pending");
            return;
        }

        self.state = ListState::Loading;
        self.load_initial_data();
    }

    /// Re-fetch page 1 without switching to the loading state
    pub fn refresh(&mut self) {
        if self.pending.is_some() {
            tracing::debug!("Refresh ignored: request already pending");
            return;
        }

        self.load_initial_data();
    }

    /// Load the next page once the last row becomes visible
    pub fn near_end_of_list(&mut self, visible_index: usize) {
        if self.primary.len().checked_sub(1) == Some(visible_index) {
            self.load_more_data();
        }
    }

    pub fn load_more_explicit(&mut self) {
        self.load_more_data();
    }

    /// Cancel whatever is in flight and remember the new query
    ///
    /// Does not fetch; callers follow up with [`Self::request_initial_load`].
    pub fn set_query(&mut self, text: impl Into<String>) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(ticket = pending.ticket.0, "Cancelling request for new query");
            self.effects.push(Effect::Cancel(pending.ticket));
        }
        self.query = text.into();
    }

    pub fn select_item(&mut self, index: usize) {
        match self.primary.get(index) {
            Some(item) => self.effects.push(Effect::Select(item.id())),
            None => tracing::warn!(index, len = self.primary.len(), "Selected row out of range"),
        }
    }

    pub fn select_secondary_item(&mut self, index: usize) {
        match self.secondary.get(index) {
            Some(item) => self.effects.push(Effect::Select(item.id())),
            None => tracing::warn!(
                index,
                len = self.secondary.len(),
                "Selected latest row out of range"
            ),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Completions
    // ─────────────────────────────────────────────────────────────────────

    /// Feed back the outcome of the fetch identified by `ticket`
    pub fn complete(&mut self, ticket: Ticket, outcome: FetchOutcome<T>) {
        let Some(pending) = self.pending.filter(|p| p.ticket == ticket) else {
            tracing::debug!(ticket = ticket.0, "Discarding response for superseded request");
            return;
        };

        match (pending.kind, outcome) {
            (RequestKind::Initial, FetchOutcome::Page(result)) => self.finish_initial(result),
            (RequestKind::More, FetchOutcome::Page(result)) => self.finish_more(result),
            (RequestKind::Latest, FetchOutcome::Latest(result)) => self.finish_latest(result),
            (kind, _) => {
                tracing::error!(ticket = ticket.0, ?kind, "Response type does not match request");
                self.pending = None;
            }
        }
    }

    fn load_initial_data(&mut self) {
        let request = FetchRequest::Page {
            page: FIRST_PAGE,
            page_size: self.page_size,
            query: self.query.clone(),
        };
        self.issue(RequestKind::Initial, request);
    }

    fn load_more_data(&mut self) {
        if self.pending.is_some() {
            return;
        }

        if let Some(total) = self.total_pages {
            if self.current_page >= total {
                self.effects.push(Effect::Emit(ListEvent::NoMoreItems));
                return;
            }
        }

        let request = FetchRequest::Page {
            page: self.current_page + 1,
            page_size: self.page_size,
            query: self.query.clone(),
        };
        self.issue(RequestKind::More, request);
    }

    fn issue(&mut self, kind: RequestKind, request: FetchRequest) {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        tracing::debug!(ticket = ticket.0, ?request, "Issuing fetch");
        self.pending = Some(Pending { ticket, kind });
        self.effects.push(Effect::Fetch { ticket, request });
    }

    fn finish_initial(&mut self, result: Result<Page<T>, FetchError>) {
        match result {
            Ok(page) => {
                self.primary = page.elements;
                self.current_page = FIRST_PAGE;
                self.total_pages = Some(page.page_count);

                if self.query.is_empty() || self.secondary.is_empty() {
                    // Final state waits for the latest list
                    self.issue(RequestKind::Latest, FetchRequest::Latest);
                } else {
                    self.state = self.resolved_state();
                    self.finish_refresh();
                }
            }
            Err(e) if e.is_cancelled() => {
                self.pending = None;
            }
            Err(e) => {
                tracing::warn!("Initial load failed: {}", e);
                self.state = ListState::Error(ErrorReason::RequestFailed);
                self.finish_refresh();
            }
        }
    }

    fn finish_latest(&mut self, result: Result<Vec<T>, FetchError>) {
        match result {
            Ok(items) => {
                self.secondary = items;
                self.state = self.resolved_state();
            }
            Err(e) if e.is_cancelled() => {
                self.pending = None;
                return;
            }
            Err(e) => {
                tracing::warn!("Latest list failed: {}", e);
                self.state = ListState::Error(ErrorReason::RequestFailed);
            }
        }
        self.finish_refresh();
    }

    fn finish_more(&mut self, result: Result<Page<T>, FetchError>) {
        self.pending = None;

        match result {
            Ok(page) => {
                self.current_page += 1;
                self.primary.extend(page.elements);
                self.total_pages = Some(page.page_count);
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                tracing::warn!(page = self.current_page + 1, "Load more failed: {}", e);
                self.effects.push(Effect::Emit(ListEvent::LoadMoreFailed));
            }
        }
    }

    fn finish_refresh(&mut self) {
        self.pending = None;
        self.effects.push(Effect::Emit(ListEvent::RefreshFinished));
    }

    fn resolved_state(&self) -> ListState {
        if !self.primary.is_empty() {
            ListState::Content
        } else if !self.query.is_empty() {
            ListState::Error(ErrorReason::NoResultsForQuery)
        } else if self.secondary.is_empty() {
            ListState::Empty
        } else {
            ListState::Content
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Drain the effects accumulated since the last call
    pub fn take_effects(&mut self) -> Vec<Effect<T::Id>> {
        std::mem::take(&mut self.effects)
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn items(&self) -> &[T] {
        &self.primary
    }

    pub fn latest(&self) -> &[T] {
        &self.secondary
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending.map(|p| p.ticket)
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        ListSnapshot {
            state: self.state,
            items: self.primary.clone(),
            latest: self.secondary.clone(),
            query: self.query.clone(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            busy: self.pending.is_some(),
        }
    }
}
