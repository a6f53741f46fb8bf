//! Coordinator tests
//!
//! The first half drives the state machine directly, delivering completions
//! by hand so ordering is fully deterministic. The second half runs the
//! spawned coordinator against a scripted source whose fetches block until
//! the test answers them.

use super::*;
use crate::model::Speaker;
use crate::source::ListSource;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn speaker(id: u64) -> Speaker {
    Speaker {
        id,
        name: format!("Speaker {}", id),
        job: None,
        avatar_url: None,
    }
}

fn speakers(ids: &[u64]) -> Vec<Speaker> {
    ids.iter().copied().map(speaker).collect()
}

fn page(ids: &[u64], number: u32, count: u32) -> Page<Speaker> {
    Page::new(speakers(ids), number, count)
}

fn ids(items: &[Speaker]) -> Vec<u64> {
    items.iter().map(|s| s.id).collect()
}

/// Take the effects and return the single fetch among them
fn expect_fetch(c: &mut SearchableListCoordinator<Speaker>) -> (Ticket, FetchRequest) {
    let effects = c.take_effects();
    let fetches: Vec<_> = effects
        .into_iter()
        .filter_map(|e| match e {
            Effect::Fetch { ticket, request } => Some((ticket, request)),
            _ => None,
        })
        .collect();
    assert_eq!(fetches.len(), 1, "expected exactly one fetch");
    fetches.into_iter().next().unwrap()
}

fn page_request(page: u32, query: &str) -> FetchRequest {
    FetchRequest::Page {
        page,
        page_size: 10,
        query: query.to_string(),
    }
}

/// Unfiltered load: page 1 = [1, 2] of 3 pages, latest = [3]
fn loaded() -> SearchableListCoordinator<Speaker> {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (t1, _) = expect_fetch(&mut c);
    c.complete(t1, FetchOutcome::Page(Ok(page(&[1, 2], 1, 3))));
    let (t2, _) = expect_fetch(&mut c);
    c.complete(t2, FetchOutcome::Latest(Ok(speakers(&[3]))));
    c.take_effects();
    c
}

// ─────────────────────────────────────────────────────────────────────────────
// Initial load
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unfiltered_load_fetches_latest_before_showing_content() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    assert_eq!(c.state(), ListState::Loading);

    let (t1, request) = expect_fetch(&mut c);
    assert_eq!(request, page_request(1, ""));

    c.complete(t1, FetchOutcome::Page(Ok(page(&[1, 2], 1, 3))));
    let (t2, request) = expect_fetch(&mut c);
    assert_eq!(request, FetchRequest::Latest);
    assert_eq!(c.state(), ListState::Loading, "final state waits for latest");
    assert_eq!(ids(c.items()), vec![1, 2]);

    c.complete(t2, FetchOutcome::Latest(Ok(speakers(&[3]))));
    assert_eq!(c.state(), ListState::Content);
    assert_eq!(ids(c.items()), vec![1, 2]);
    assert_eq!(ids(c.latest()), vec![3]);
    assert_eq!(c.current_page(), 1);
    assert_eq!(c.total_pages(), Some(3));
    assert_eq!(c.pending_ticket(), None);
    assert_eq!(
        c.take_effects(),
        vec![Effect::Emit(ListEvent::RefreshFinished)]
    );
}

#[test]
fn empty_search_result_reports_no_results_without_refetching_latest() {
    let mut c = loaded();
    c.set_query("abc");
    c.request_initial_load();

    let (ticket, request) = expect_fetch(&mut c);
    assert_eq!(request, page_request(1, "abc"));

    c.complete(ticket, FetchOutcome::Page(Ok(page(&[], 1, 0))));
    assert_eq!(
        c.take_effects(),
        vec![Effect::Emit(ListEvent::RefreshFinished)],
        "no latest fetch once latest is populated"
    );
    assert_eq!(c.state(), ListState::Error(ErrorReason::NoResultsForQuery));
    assert_eq!(ids(c.latest()), vec![3]);
    assert_eq!(c.pending_ticket(), None);
}

#[test]
fn search_with_results_shows_content_immediately() {
    let mut c = loaded();
    c.set_query("sp");
    c.request_initial_load();
    let (ticket, _) = expect_fetch(&mut c);

    c.complete(ticket, FetchOutcome::Page(Ok(page(&[7], 1, 1))));
    assert_eq!(c.state(), ListState::Content);
    assert_eq!(ids(c.items()), vec![7]);
}

#[test]
fn search_before_latest_is_loaded_still_fetches_latest() {
    let mut c = SearchableListCoordinator::new(10);
    c.set_query("abc");
    c.request_initial_load();
    let (t1, _) = expect_fetch(&mut c);

    c.complete(t1, FetchOutcome::Page(Ok(page(&[], 1, 0))));
    let (t2, request) = expect_fetch(&mut c);
    assert_eq!(request, FetchRequest::Latest);

    c.complete(t2, FetchOutcome::Latest(Ok(speakers(&[4, 5]))));
    assert_eq!(c.state(), ListState::Error(ErrorReason::NoResultsForQuery));
    assert_eq!(ids(c.latest()), vec![4, 5]);
}

#[test]
fn unfiltered_empty_catalog_is_empty_state() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (t1, _) = expect_fetch(&mut c);
    c.complete(t1, FetchOutcome::Page(Ok(page(&[], 1, 0))));
    let (t2, _) = expect_fetch(&mut c);
    c.complete(t2, FetchOutcome::Latest(Ok(Vec::new())));

    assert_eq!(c.state(), ListState::Empty);
}

#[test]
fn initial_failure_sets_request_failed() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (ticket, _) = expect_fetch(&mut c);

    c.complete(
        ticket,
        FetchOutcome::Page(Err(FetchError::Transport("connection reset".into()))),
    );
    assert_eq!(c.state(), ListState::Error(ErrorReason::RequestFailed));
    assert_eq!(c.pending_ticket(), None);
    assert_eq!(
        c.take_effects(),
        vec![Effect::Emit(ListEvent::RefreshFinished)]
    );
}

#[test]
fn latest_failure_keeps_primary_items_but_reports_error() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (t1, _) = expect_fetch(&mut c);
    c.complete(t1, FetchOutcome::Page(Ok(page(&[1, 2], 1, 1))));
    let (t2, _) = expect_fetch(&mut c);

    c.complete(
        t2,
        FetchOutcome::Latest(Err(FetchError::Status {
            status: 500,
            message: "boom".into(),
        })),
    );
    assert_eq!(c.state(), ListState::Error(ErrorReason::RequestFailed));
    assert_eq!(ids(c.items()), vec![1, 2]);
    assert_eq!(c.pending_ticket(), None);
}

#[test]
fn cancelled_outcome_never_changes_state() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (ticket, _) = expect_fetch(&mut c);

    c.complete(ticket, FetchOutcome::Page(Err(FetchError::Cancelled)));
    assert_eq!(c.state(), ListState::Loading);
    assert!(c.take_effects().is_empty());
    assert_eq!(c.pending_ticket(), None);
}

#[test]
fn refresh_keeps_content_visible_and_is_idempotent() {
    let mut c = loaded();
    c.refresh();
    c.refresh();

    let (ticket, request) = expect_fetch(&mut c);
    assert_eq!(request, page_request(1, ""));
    assert_eq!(c.state(), ListState::Content);

    c.complete(ticket, FetchOutcome::Page(Ok(page(&[1, 2], 1, 3))));
    let (latest, _) = expect_fetch(&mut c);
    c.complete(latest, FetchOutcome::Latest(Ok(speakers(&[3]))));

    let once = loaded();
    assert_eq!(c.snapshot(), once.snapshot());
}

#[test]
fn initial_load_is_ignored_while_request_pending() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    c.request_initial_load();
    c.load_more_explicit();

    expect_fetch(&mut c);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cancellation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn set_query_cancels_pending_request() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (t1, _) = expect_fetch(&mut c);

    c.set_query("x");
    assert_eq!(c.take_effects(), vec![Effect::Cancel(t1)]);
    assert_eq!(c.pending_ticket(), None);
    assert_eq!(c.query(), "x");
}

#[test]
fn set_query_without_pending_request_only_stores_query() {
    let mut c = loaded();
    c.set_query("swift");
    assert!(c.take_effects().is_empty());
    assert_eq!(c.query(), "swift");
    assert_eq!(c.state(), ListState::Content);
}

#[test]
fn stale_response_after_new_query_is_discarded() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (stale, _) = expect_fetch(&mut c);

    c.set_query("x");
    c.request_initial_load();
    let (fresh, request) = expect_fetch(&mut c);
    assert_eq!(request, page_request(1, "x"));

    // Stale response arriving while the new one is pending
    c.complete(stale, FetchOutcome::Page(Ok(page(&[1, 2], 1, 5))));
    assert_eq!(c.pending_ticket(), Some(fresh));
    assert!(c.items().is_empty());

    c.complete(fresh, FetchOutcome::Page(Ok(page(&[42], 1, 1))));
    let (latest, _) = expect_fetch(&mut c);
    c.complete(latest, FetchOutcome::Latest(Ok(speakers(&[9]))));
    let settled = c.snapshot();
    c.take_effects();

    // ...and after the new query has settled
    c.complete(stale, FetchOutcome::Page(Ok(page(&[1, 2], 1, 5))));
    assert_eq!(c.snapshot(), settled);
    assert!(c.take_effects().is_empty());
    assert_eq!(ids(c.items()), vec![42]);
}

#[test]
fn new_query_during_latest_fetch_discards_latest_response() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (t1, _) = expect_fetch(&mut c);
    c.complete(t1, FetchOutcome::Page(Ok(page(&[1], 1, 1))));
    let (latest, _) = expect_fetch(&mut c);

    c.set_query("y");
    assert_eq!(c.take_effects(), vec![Effect::Cancel(latest)]);

    c.complete(latest, FetchOutcome::Latest(Ok(speakers(&[9]))));
    assert!(c.latest().is_empty());
    assert_eq!(c.state(), ListState::Loading);
}

#[test]
fn tickets_are_unique_across_requests() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (t1, _) = expect_fetch(&mut c);
    c.set_query("a");
    c.take_effects();
    c.request_initial_load();
    let (t2, _) = expect_fetch(&mut c);

    assert!(t2 > t1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn load_more_on_last_page_emits_no_more_items() {
    let mut c = SearchableListCoordinator::new(10);
    c.request_initial_load();
    let (t1, _) = expect_fetch(&mut c);
    c.complete(t1, FetchOutcome::Page(Ok(page(&[1], 1, 2))));
    let (t2, _) = expect_fetch(&mut c);
    c.complete(t2, FetchOutcome::Latest(Ok(speakers(&[3]))));
    c.take_effects();

    c.load_more_explicit();
    let (t3, request) = expect_fetch(&mut c);
    assert_eq!(request, page_request(2, ""));
    c.complete(t3, FetchOutcome::Page(Ok(page(&[2], 2, 2))));
    assert_eq!(c.current_page(), 2);

    c.load_more_explicit();
    assert_eq!(c.take_effects(), vec![Effect::Emit(ListEvent::NoMoreItems)]);
    assert_eq!(c.pending_ticket(), None);
}

#[test]
fn load_more_failure_keeps_items_and_allows_retry() {
    let mut c = loaded();
    c.load_more_explicit();
    let (ticket, _) = expect_fetch(&mut c);

    c.complete(
        ticket,
        FetchOutcome::Page(Err(FetchError::Transport("offline".into()))),
    );
    assert_eq!(
        c.take_effects(),
        vec![Effect::Emit(ListEvent::LoadMoreFailed)]
    );
    assert_eq!(ids(c.items()), vec![1, 2]);
    assert_eq!(c.current_page(), 1);
    assert_eq!(c.pending_ticket(), None);

    c.load_more_explicit();
    let (_, request) = expect_fetch(&mut c);
    assert_eq!(request, page_request(2, ""));
}

#[test]
fn cancelled_load_more_is_silent() {
    let mut c = loaded();
    c.load_more_explicit();
    let (ticket, _) = expect_fetch(&mut c);

    c.complete(ticket, FetchOutcome::Page(Err(FetchError::Cancelled)));
    assert!(c.take_effects().is_empty());
    assert_eq!(c.pending_ticket(), None);
}

#[test]
fn pages_append_in_order_and_never_pass_total() {
    let mut c = loaded();

    for (next, ids_on_page) in [(2u32, [10u64, 11]), (3, [20, 21])] {
        c.near_end_of_list(c.items().len() - 1);
        let (ticket, request) = expect_fetch(&mut c);
        assert_eq!(request, page_request(next, ""));

        let before = c.current_page();
        c.complete(ticket, FetchOutcome::Page(Ok(page(&ids_on_page, next, 3))));
        assert_eq!(c.current_page(), before + 1);
        assert!(c.current_page() <= c.total_pages().unwrap());
    }

    assert_eq!(ids(c.items()), vec![1, 2, 10, 11, 20, 21]);

    c.near_end_of_list(c.items().len() - 1);
    assert_eq!(c.take_effects(), vec![Effect::Emit(ListEvent::NoMoreItems)]);
}

#[test]
fn near_end_of_list_only_fires_for_last_row() {
    let mut c = loaded();

    c.near_end_of_list(0);
    assert!(c.take_effects().is_empty());

    c.near_end_of_list(5);
    assert!(c.take_effects().is_empty());

    c.near_end_of_list(1);
    let (_, request) = expect_fetch(&mut c);
    assert_eq!(request, page_request(2, ""));
}

#[test]
fn near_end_of_empty_list_does_nothing() {
    let mut c = SearchableListCoordinator::<Speaker>::new(10);
    c.near_end_of_list(0);
    assert!(c.take_effects().is_empty());
}

#[test]
fn unknown_total_pages_permits_a_fetch() {
    let mut c = SearchableListCoordinator::new(10);
    c.load_more_explicit();

    let (ticket, request) = expect_fetch(&mut c);
    assert_eq!(request, page_request(1, ""));

    c.complete(ticket, FetchOutcome::Page(Ok(page(&[1], 1, 4))));
    assert_eq!(c.current_page(), 1);
    assert_eq!(c.total_pages(), Some(4));
}

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn selecting_rows_reports_ids() {
    let mut c = loaded();

    c.select_item(1);
    c.select_secondary_item(0);
    assert_eq!(c.take_effects(), vec![Effect::Select(2), Effect::Select(3)]);
}

#[test]
fn selecting_out_of_range_is_ignored() {
    let mut c = loaded();

    c.select_item(2);
    c.select_secondary_item(1);
    assert!(c.take_effects().is_empty());
    assert_eq!(c.state(), ListState::Content);
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime
// ─────────────────────────────────────────────────────────────────────────────

/// A fetch waiting for the test to answer it
struct Call {
    request: FetchRequest,
    reply: oneshot::Sender<FetchOutcome<Speaker>>,
}

struct ScriptedSource {
    calls: mpsc::UnboundedSender<Call>,
}

impl ScriptedSource {
    async fn call(&self, request: FetchRequest) -> Option<FetchOutcome<Speaker>> {
        let (reply, rx) = oneshot::channel();
        self.calls.send(Call { request, reply }).ok()?;
        rx.await.ok()
    }
}

#[async_trait]
impl ListSource<Speaker> for ScriptedSource {
    async fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
        query: &str,
    ) -> Result<Page<Speaker>, FetchError> {
        let request = FetchRequest::Page {
            page,
            page_size,
            query: query.to_string(),
        };
        match self.call(request).await {
            Some(FetchOutcome::Page(result)) => result,
            _ => Err(FetchError::Cancelled),
        }
    }

    async fn fetch_latest(&self) -> Result<Vec<Speaker>, FetchError> {
        match self.call(FetchRequest::Latest).await {
            Some(FetchOutcome::Latest(result)) => result,
            _ => Err(FetchError::Cancelled),
        }
    }
}

fn scripted() -> (ListHandle<Speaker>, mpsc::UnboundedReceiver<Call>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = CoordinatorBuilder::<Speaker>::new(Arc::new(ScriptedSource { calls: tx }))
        .page_size(2)
        .spawn();
    (handle, rx)
}

async fn next_call(calls: &mut mpsc::UnboundedReceiver<Call>) -> Call {
    timeout(Duration::from_secs(2), calls.recv())
        .await
        .expect("no fetch was issued")
        .expect("source dropped")
}

async fn wait_until(
    handle: &ListHandle<Speaker>,
    predicate: impl FnMut(&ListSnapshot<Speaker>) -> bool,
) -> ListSnapshot<Speaker> {
    let mut rx = handle.subscribe();
    let snapshot = timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("coordinator stopped")
        .clone();
    snapshot
}

fn small_page(ids: &[u64], number: u32, count: u32) -> FetchOutcome<Speaker> {
    FetchOutcome::Page(Ok(page(ids, number, count)))
}

#[tokio::test]
async fn runtime_loads_page_and_latest() {
    let (handle, mut calls) = scripted();
    assert_eq!(handle.current().state, ListState::Loading);

    handle.request_initial_load();
    let first = next_call(&mut calls).await;
    assert_eq!(
        first.request,
        FetchRequest::Page {
            page: 1,
            page_size: 2,
            query: String::new()
        }
    );
    first.reply.send(small_page(&[1, 2], 1, 3)).ok();

    let latest = next_call(&mut calls).await;
    assert_eq!(latest.request, FetchRequest::Latest);
    latest.reply.send(FetchOutcome::Latest(Ok(speakers(&[3])))).ok();

    let snapshot = wait_until(&handle, |s| s.state == ListState::Content).await;
    assert_eq!(ids(&snapshot.items), vec![1, 2]);
    assert_eq!(ids(&snapshot.latest), vec![3]);
    assert!(!snapshot.busy);

    handle.shutdown().await;
}

#[tokio::test]
async fn runtime_discards_response_superseded_by_new_query() {
    let (handle, mut calls) = scripted();

    handle.request_initial_load();
    let stale = next_call(&mut calls).await;

    handle.set_query("x");
    handle.request_initial_load();
    let fresh = next_call(&mut calls).await;
    assert!(matches!(&fresh.request, FetchRequest::Page { query, .. } if query == "x"));

    fresh.reply.send(small_page(&[7], 1, 1)).ok();
    next_call(&mut calls)
        .await
        .reply
        .send(FetchOutcome::Latest(Ok(speakers(&[9]))))
        .ok();
    let settled = wait_until(&handle, |s| s.state == ListState::Content && !s.busy).await;

    // The stale task was aborted; even if it were not, its ticket is dead
    let _ = stale.reply.send(small_page(&[1, 2], 1, 5));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(handle.current(), settled);
    assert_eq!(ids(&settled.items), vec![7]);
    assert_eq!(settled.query, "x");
}

#[tokio::test]
async fn runtime_keeps_a_single_request_in_flight() {
    let (handle, mut calls) = scripted();

    handle.request_initial_load();
    handle.refresh();
    handle.load_more();
    let only = next_call(&mut calls).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(calls.try_recv().is_err(), "second fetch issued while pending");
    assert!(handle.current().busy);

    drop(only);
}

#[tokio::test]
async fn runtime_emits_one_shot_events() {
    let (handle, mut calls) = scripted();
    let mut events = handle.subscribe_events();

    handle.request_initial_load();
    next_call(&mut calls).await.reply.send(small_page(&[1], 1, 1)).ok();
    next_call(&mut calls)
        .await
        .reply
        .send(FetchOutcome::Latest(Ok(Vec::new())))
        .ok();

    let event = timeout(Duration::from_secs(2), events.recv()).await.unwrap();
    assert_eq!(event.unwrap(), ListEvent::RefreshFinished);

    handle.near_end_of_list(0);
    let event = timeout(Duration::from_secs(2), events.recv()).await.unwrap();
    assert_eq!(event.unwrap(), ListEvent::NoMoreItems);
}

#[tokio::test]
async fn runtime_reports_load_more_failure() {
    let (handle, mut calls) = scripted();
    let mut events = handle.subscribe_events();

    handle.request_initial_load();
    next_call(&mut calls).await.reply.send(small_page(&[1, 2], 1, 2)).ok();
    next_call(&mut calls)
        .await
        .reply
        .send(FetchOutcome::Latest(Ok(Vec::new())))
        .ok();
    wait_until(&handle, |s| s.state == ListState::Content && !s.busy).await;

    handle.load_more();
    next_call(&mut calls)
        .await
        .reply
        .send(FetchOutcome::Page(Err(FetchError::Transport("offline".into()))))
        .ok();

    let mut saw_failure = false;
    while let Ok(Ok(event)) = timeout(Duration::from_secs(2), events.recv()).await {
        if event == ListEvent::LoadMoreFailed {
            saw_failure = true;
            break;
        }
    }
    assert!(saw_failure);
    assert_eq!(ids(&handle.current().items), vec![1, 2]);
}

struct ChannelDelegate(mpsc::UnboundedSender<u64>);

impl SelectionDelegate<u64> for ChannelDelegate {
    fn item_selected(&self, id: u64) {
        let _ = self.0.send(id);
    }
}

#[tokio::test]
async fn runtime_forwards_selection_to_delegate() {
    let (calls_tx, mut calls) = mpsc::unbounded_channel();
    let (selected_tx, mut selected) = mpsc::unbounded_channel();
    let delegate = Arc::new(ChannelDelegate(selected_tx));
    let handle = CoordinatorBuilder::<Speaker>::new(Arc::new(ScriptedSource { calls: calls_tx }))
        .delegate(&delegate)
        .spawn();

    handle.request_initial_load();
    next_call(&mut calls).await.reply.send(small_page(&[4, 5], 1, 1)).ok();
    next_call(&mut calls)
        .await
        .reply
        .send(FetchOutcome::Latest(Ok(speakers(&[8]))))
        .ok();
    wait_until(&handle, |s| s.state == ListState::Content).await;

    handle.select_item(1);
    handle.select_latest(0);
    let first = timeout(Duration::from_secs(2), selected.recv()).await.unwrap();
    let second = timeout(Duration::from_secs(2), selected.recv()).await.unwrap();
    assert_eq!((first, second), (Some(5), Some(8)));
}

#[tokio::test]
async fn runtime_survives_dropped_delegate() {
    let (calls_tx, mut calls) = mpsc::unbounded_channel();
    let (selected_tx, _selected) = mpsc::unbounded_channel();
    let delegate = Arc::new(ChannelDelegate(selected_tx));
    let handle = CoordinatorBuilder::<Speaker>::new(Arc::new(ScriptedSource { calls: calls_tx }))
        .delegate(&delegate)
        .spawn();

    handle.request_initial_load();
    next_call(&mut calls).await.reply.send(small_page(&[4], 1, 1)).ok();
    next_call(&mut calls)
        .await
        .reply
        .send(FetchOutcome::Latest(Ok(Vec::new())))
        .ok();
    wait_until(&handle, |s| s.state == ListState::Content).await;

    drop(delegate);
    handle.select_item(0);

    // The coordinator keeps serving intents after the delegate is gone
    handle.refresh();
    let call = next_call(&mut calls).await;
    assert!(matches!(call.request, FetchRequest::Page { page: 1, .. }));
}

#[tokio::test]
async fn late_subscribers_receive_current_snapshot() {
    use futures::StreamExt;

    let (handle, mut calls) = scripted();
    handle.set_query("late");
    handle.request_initial_load();
    next_call(&mut calls).await;

    let mut stream = handle.snapshots();
    let first = timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.query, "late");
    assert!(first.busy);
}

#[tokio::test]
async fn event_stream_yields_refresh_then_no_more_items() {
    use futures::StreamExt;

    let (handle, mut calls) = scripted();
    let mut events = handle.events();

    handle.refresh();
    next_call(&mut calls).await.reply.send(small_page(&[1, 2], 1, 1)).ok();
    next_call(&mut calls)
        .await
        .reply
        .send(FetchOutcome::Latest(Ok(speakers(&[3]))))
        .ok();
    wait_until(&handle, |s| !s.busy && s.items.len() == 2).await;
    handle.load_more();

    let mut received = Vec::new();
    while received.len() < 2 {
        let next = timeout(Duration::from_secs(2), events.next())
            .await
            .expect("timed out waiting for event")
            .expect("event stream ended");
        received.push(next.expect("event stream lagged"));
    }
    assert_eq!(received, vec![ListEvent::RefreshFinished, ListEvent::NoMoreItems]);
}

#[tokio::test(start_paused = true)]
async fn runtime_against_demo_source() {
    use crate::source::DemoSource;

    let source = Arc::new(DemoSource::generated(25, Duration::from_millis(200)));
    let handle = CoordinatorBuilder::<Speaker>::new(source).page_size(10).spawn();

    handle.request_initial_load();
    let snapshot = wait_until(&handle, |s| s.state == ListState::Content).await;
    assert_eq!(snapshot.items.len(), 10);
    assert_eq!(snapshot.total_pages, Some(3));
    assert_eq!(snapshot.latest.len(), 5);

    handle.set_query("nobody-by-this-name");
    handle.request_initial_load();
    let snapshot = wait_until(&handle, |s| {
        s.state == ListState::Error(ErrorReason::NoResultsForQuery)
    })
    .await;
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.latest.len(), 5);
}
