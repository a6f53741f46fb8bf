// Async driver for the list coordinator
//
// One tokio task owns the coordinator. Intents arrive over an unbounded mpsc
// channel (so the view can fire them synchronously), fetches run as spawned
// tasks that report back over a second channel, and every change is
// published through a watch channel. New subscribers to a watch channel see
// the current value right away, so a view attached late still renders the
// latest snapshot. One-shot events go through a broadcast channel.
//
// Cancellation happens twice: the fetch task is aborted (dropping the
// in-flight HTTP future), and the coordinator ignores any completion whose
// ticket is no longer pending, in case the task finished first.

use super::{Effect, FetchOutcome, FetchRequest, Intent, SearchableListCoordinator, Ticket};
use crate::model::{ListEvent, ListItem, ListSnapshot};
use crate::source::ListSource;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tokio_stream::wrappers::{BroadcastStream, WatchStream};

/// Buffered one-shot events per subscriber before old ones are dropped
const EVENT_CAPACITY: usize = 64;

/// Receives the id of a tapped row (typically to navigate to a detail screen)
pub trait SelectionDelegate<Id>: Send + Sync {
    fn item_selected(&self, id: Id);
}

/// Configures and starts a coordinator task
pub struct CoordinatorBuilder<T: ListItem> {
    source: Arc<dyn ListSource<T>>,
    page_size: u32,
    delegate: Option<Weak<dyn SelectionDelegate<T::Id>>>,
}

impl<T: ListItem> CoordinatorBuilder<T> {
    pub fn new(source: Arc<dyn ListSource<T>>) -> Self {
        Self {
            source,
            page_size: super::DEFAULT_PAGE_SIZE,
            delegate: None,
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Register the selection delegate without taking ownership of it
    ///
    /// Once the delegate is dropped, selections are logged and ignored.
    pub fn delegate<D>(mut self, delegate: &Arc<D>) -> Self
    where
        D: SelectionDelegate<T::Id> + 'static,
    {
        let weak: Weak<D> = Arc::downgrade(delegate);
        self.delegate = Some(weak);
        self
    }

    /// Spawn the coordinator task on the current tokio runtime
    pub fn spawn(self) -> ListHandle<T> {
        let coordinator = SearchableListCoordinator::new(self.page_size);
        let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.snapshot());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let task = CoordinatorTask {
            coordinator,
            source: self.source,
            delegate: self.delegate,
            snapshot_tx,
            events_tx: events_tx.clone(),
            completion_tx,
            in_flight: HashMap::new(),
        };

        tracing::debug!(page_size = self.page_size, "Starting list coordinator");
        let join = tokio::spawn(task.run(intent_rx, completion_rx));

        ListHandle {
            intents: intent_tx,
            snapshot: snapshot_rx,
            events: events_tx,
            task: join,
        }
    }
}

/// The view's side of a running coordinator
///
/// Intent methods never block; they queue the intent for the coordinator
/// task. Dropping the handle (or calling [`ListHandle::shutdown`]) stops the
/// task and aborts any fetch still in flight.
pub struct ListHandle<T: ListItem> {
    intents: mpsc::UnboundedSender<Intent>,
    snapshot: watch::Receiver<ListSnapshot<T>>,
    events: broadcast::Sender<ListEvent>,
    task: JoinHandle<()>,
}

impl<T: ListItem> ListHandle<T> {
    pub fn send(&self, intent: Intent) {
        if self.intents.send(intent).is_err() {
            tracing::warn!("List coordinator has stopped; intent dropped");
        }
    }

    pub fn request_initial_load(&self) {
        self.send(Intent::InitialLoad);
    }

    pub fn refresh(&self) {
        self.send(Intent::Refresh);
    }

    pub fn near_end_of_list(&self, visible_index: usize) {
        self.send(Intent::NearEndOfList(visible_index));
    }

    pub fn load_more(&self) {
        self.send(Intent::LoadMore);
    }

    pub fn set_query(&self, text: impl Into<String>) {
        self.send(Intent::SetQuery(text.into()));
    }

    pub fn select_item(&self, index: usize) {
        self.send(Intent::SelectItem(index));
    }

    pub fn select_latest(&self, index: usize) {
        self.send(Intent::SelectLatest(index));
    }

    /// Latest published snapshot
    pub fn current(&self) -> ListSnapshot<T> {
        self.snapshot.borrow().clone()
    }

    /// Receiver that starts with the current snapshot
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<T>> {
        let mut rx = self.snapshot.clone();
        rx.mark_changed();
        rx
    }

    /// Stream of snapshots, yielding the current one first
    pub fn snapshots(&self) -> WatchStream<ListSnapshot<T>> {
        WatchStream::new(self.snapshot.clone())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> BroadcastStream<ListEvent> {
        BroadcastStream::new(self.events.subscribe())
    }

    /// Stop the coordinator and wait for its task to finish
    pub async fn shutdown(self) {
        let ListHandle { intents, task, .. } = self;
        drop(intents);
        if let Err(e) = task.await {
            tracing::warn!("List coordinator task ended abnormally: {}", e);
        }
    }
}

struct Completion<T> {
    ticket: Ticket,
    outcome: FetchOutcome<T>,
}

struct CoordinatorTask<T: ListItem> {
    coordinator: SearchableListCoordinator<T>,
    source: Arc<dyn ListSource<T>>,
    delegate: Option<Weak<dyn SelectionDelegate<T::Id>>>,
    snapshot_tx: watch::Sender<ListSnapshot<T>>,
    events_tx: broadcast::Sender<ListEvent>,
    completion_tx: mpsc::UnboundedSender<Completion<T>>,
    in_flight: HashMap<Ticket, AbortHandle>,
}

impl<T: ListItem> CoordinatorTask<T> {
    async fn run(
        mut self,
        mut intents: mpsc::UnboundedReceiver<Intent>,
        mut completions: mpsc::UnboundedReceiver<Completion<T>>,
    ) {
        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => {
                        tracing::trace!(?intent, "Intent received");
                        self.coordinator.handle(intent);
                    }
                    None => break,
                },

                // The task holds a sender, so this never yields None
                Some(done) = completions.recv() => {
                    self.in_flight.remove(&done.ticket);
                    self.coordinator.complete(done.ticket, done.outcome);
                }
            }

            self.apply_effects();
            self.publish();
        }

        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        tracing::debug!("List coordinator stopped");
    }

    fn apply_effects(&mut self) {
        for effect in self.coordinator.take_effects() {
            match effect {
                Effect::Fetch { ticket, request } => self.spawn_fetch(ticket, request),
                Effect::Cancel(ticket) => {
                    if let Some(handle) = self.in_flight.remove(&ticket) {
                        handle.abort();
                    }
                }
                Effect::Emit(event) => {
                    // No subscribers is fine
                    let _ = self.events_tx.send(event);
                }
                Effect::Select(id) => match self.delegate.as_ref().and_then(Weak::upgrade) {
                    Some(delegate) => delegate.item_selected(id),
                    None => tracing::debug!(?id, "Selection ignored: no delegate"),
                },
            }
        }
    }

    fn spawn_fetch(&mut self, ticket: Ticket, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.completion_tx.clone();

        let handle = tokio::spawn(async move {
            let outcome = match request {
                FetchRequest::Page {
                    page,
                    page_size,
                    query,
                } => FetchOutcome::Page(source.fetch_page(page, page_size, &query).await),
                FetchRequest::Latest => FetchOutcome::Latest(source.fetch_latest().await),
            };
            let _ = tx.send(Completion { ticket, outcome });
        });

        self.in_flight.insert(ticket, handle.abort_handle());
    }

    fn publish(&self) {
        let next = self.coordinator.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
