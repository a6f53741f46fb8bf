// Data types that flow between a list source, the coordinator and the view
//
// Items are opaque to the coordinator: it only needs an identifier to hand to
// the selection delegate. Everything else (pages, state, one-shot events) is
// plain data so the rendering layer can pattern match on it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A record that can be shown in a list and identified for navigation
pub trait ListItem: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    type Id: Clone + fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// A conference speaker as returned by the speakers API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: u64,
    pub name: String,
    /// Job title / company line shown under the name
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default, rename = "avatar")]
    pub avatar_url: Option<String>,
}

impl ListItem for Speaker {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

/// One fetched batch of items plus pagination metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub elements: Vec<T>,
    pub page_number: u32,
    pub page_count: u32,
}

impl<T> Page<T> {
    pub fn new(elements: Vec<T>, page_number: u32, page_count: u32) -> Self {
        Self {
            elements,
            page_number,
            page_count,
        }
    }
}

/// Why the list is showing an error view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    /// Transport or server failure (retry with refresh)
    RequestFailed,
    /// The active query matched nothing
    NoResultsForQuery,
}

/// What the rendering layer should display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Content,
    Error(ErrorReason),
    Empty,
}

impl ListState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListState::Loading => "loading",
            ListState::Content => "content",
            ListState::Error(ErrorReason::RequestFailed) => "error (request failed)",
            ListState::Error(ErrorReason::NoResultsForQuery) => "error (no results)",
            ListState::Empty => "empty",
        }
    }
}

impl fmt::Display for ListState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-shot signals that are not part of the replayed snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    /// Pagination reached the last known page
    NoMoreItems,
    /// A load-more fetch failed; the list itself is unchanged
    LoadMoreFailed,
    /// An initial load or refresh finished (successfully or not)
    RefreshFinished,
}

/// Everything the view needs to render the list at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T> {
    pub state: ListState,
    pub items: Vec<T>,
    pub latest: Vec<T>,
    pub query: String,
    pub current_page: u32,
    /// `None` until the first page response arrives
    pub total_pages: Option<u32>,
    /// A fetch is outstanding
    pub busy: bool,
}

impl<T> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self {
            state: ListState::Loading,
            items: Vec::new(),
            latest: Vec::new(),
            query: String::new(),
            current_page: 0,
            total_pages: None,
            busy: false,
        }
    }
}
