//! List sources: where pages of items come from
//!
//! The coordinator never talks HTTP itself. It asks a [`ListSource`] for a
//! page (or for the fixed "latest" list) and translates whatever comes back
//! into list state. Two sources ship with the crate:
//!
//! - [`HttpSource`]: the speakers REST API
//! - [`DemoSource`]: an in-memory catalog with simulated latency

use crate::model::{ListItem, Page};
use async_trait::async_trait;
use std::fmt;

mod demo;
mod http;

pub use demo::DemoSource;
pub use http::HttpSource;

/// Errors a source can report for a single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request was superseded and should be ignored, never shown
    Cancelled,
    /// Network failure, timeout, connection refused
    Transport(String),
    /// Server answered with a non-success status
    Status { status: u16, message: String },
    /// Response body could not be decoded
    Decode(String),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "Request cancelled"),
            Self::Transport(msg) => write!(f, "Network error: {}", msg),
            Self::Status { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            Self::Decode(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Paged, searchable data source consumed by the coordinator
///
/// Implementations must be cheap to share: the coordinator holds one behind
/// an `Arc` and calls it from spawned tasks. Dropping a returned future must
/// be safe, since that is how superseded requests are cancelled.
#[async_trait]
pub trait ListSource<T: ListItem>: Send + Sync {
    /// Fetch one page of items matching `query` (empty query = everything)
    async fn fetch_page(&self, page: u32, page_size: u32, query: &str)
        -> Result<Page<T>, FetchError>;

    /// Fetch the fixed, non-paged "latest items" list
    async fn fetch_latest(&self) -> Result<Vec<T>, FetchError>;
}
