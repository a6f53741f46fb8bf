//! Incremental search-list controller
//!
//! Coordinates a paged, searchable list: initial load, a secondary "latest
//! items" list, pagination, and live search where a new query supersedes
//! (and cancels) whatever request was in flight. The view layer sends
//! intents and renders the published [`ListSnapshot`]s.
//!
//! ```no_run
//! use searchlist::{CoordinatorBuilder, DemoSource, Speaker};
//! use std::{sync::Arc, time::Duration};
//!
//! # async fn demo() {
//! let source = Arc::new(DemoSource::generated(40, Duration::from_millis(100)));
//! let list = CoordinatorBuilder::<Speaker>::new(source).page_size(10).spawn();
//!
//! list.request_initial_load();
//! let mut snapshots = list.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     println!("{}", snapshots.borrow().state);
//! }
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod logging;
pub mod model;
pub mod shell;
pub mod source;

pub use coordinator::{
    CoordinatorBuilder, Intent, ListHandle, SearchableListCoordinator, SelectionDelegate,
};
pub use model::{ErrorReason, ListEvent, ListItem, ListSnapshot, ListState, Page, Speaker};
pub use source::{DemoSource, FetchError, HttpSource, ListSource};
