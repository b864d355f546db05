//! Listing feed builder and top-level API.
//!
//! Use [`ListingFeedBuilder`] to attach a listing source, game data, the
//! active filter and a notification sink, then call
//! [`build()`](ListingFeedBuilder::build) to start the feed task. The
//! returned [`ListingFeed`] yields one [`ListingVerdict`] per evaluation and
//! accepts filter updates. Every filter update re-evaluates all tracked
//! listings.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::filter::evaluate::ActiveFilter;
use crate::gamedata::{GameData, StaticGameData};
use crate::metrics::{FeedMetrics, MetricsHandle};
use crate::model::{Listing, ListingEvent, ListingId, ListingVerdict};
use crate::notify::{Notification, NotificationSink, highlight_notification, join_notice};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("no listing source configured")]
    NoSource,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`ListingFeed`].
///
/// A listing source is required. Without game data only the built-in class
/// job table is available, so category checks see no duties. Without a sink
/// notifications are dropped.
///
/// The feed keeps every received listing so it can re-evaluate them when the
/// filter changes. A listing is only released by [`ListingEvent::Withdrawn`]
/// or [`ListingEvent::Cleared`]; a source that never sends either keeps every
/// distinct listing in memory for the lifetime of the feed.
pub struct ListingFeedBuilder {
    source: Option<mpsc::Receiver<ListingEvent>>,
    game_data: Option<Arc<dyn GameData>>,
    filter: ActiveFilter,
    sink: Option<Arc<dyn NotificationSink>>,
    show_description_on_join: bool,
    verdict_channel_capacity: usize,
}

impl Default for ListingFeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingFeedBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            game_data: None,
            filter: ActiveFilter::default(),
            sink: None,
            show_description_on_join: false,
            verdict_channel_capacity: 256,
        }
    }

    /// Set the receiving end of the listing source.
    pub fn source(mut self, rx: mpsc::Receiver<ListingEvent>) -> Self {
        self.source = Some(rx);
        self
    }

    pub fn game_data(mut self, data: Arc<dyn GameData>) -> Self {
        self.game_data = Some(data);
        self
    }

    /// Set the initial filter. Defaults to no active preset.
    pub fn filter(mut self, filter: ActiveFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn show_description_on_join(mut self, enabled: bool) -> Self {
        self.show_description_on_join = enabled;
        self
    }

    pub fn verdict_channel_capacity(mut self, cap: usize) -> Self {
        self.verdict_channel_capacity = cap;
        self
    }

    /// Build and start the feed. Must be called inside a tokio runtime.
    pub fn build(self) -> Result<ListingFeed, FeedError> {
        let source_rx = self.source.ok_or(FeedError::NoSource)?;
        let game_data = self
            .game_data
            .unwrap_or_else(|| Arc::new(StaticGameData::with_builtin_jobs()));

        let shutdown = CancellationToken::new();
        let metrics = MetricsHandle::new();
        let show_description_on_join = Arc::new(AtomicBool::new(self.show_description_on_join));

        let (verdict_tx, verdict_rx) = mpsc::channel(self.verdict_channel_capacity.max(1));
        let (filter_tx, filter_rx) = watch::channel(self.filter);

        let task = FeedTask {
            game_data,
            sink: self.sink,
            metrics: metrics.clone(),
            show_description_on_join: show_description_on_join.clone(),
            tracked: BTreeMap::new(),
        };
        let handle = tokio::spawn(task.run(source_rx, verdict_tx, filter_rx, shutdown.clone()));

        Ok(ListingFeed {
            verdict_rx,
            shutdown,
            filter_tx,
            metrics,
            show_description_on_join,
            _task: handle,
        })
    }
}

// ---------------------------------------------------------------------------
// ListingFeed handle
// ---------------------------------------------------------------------------

/// Handle to a running listing feed.
pub struct ListingFeed {
    verdict_rx: mpsc::Receiver<ListingVerdict>,
    shutdown: CancellationToken,
    filter_tx: watch::Sender<ActiveFilter>,
    metrics: MetricsHandle,
    show_description_on_join: Arc<AtomicBool>,
    _task: JoinHandle<()>,
}

impl ListingFeed {
    /// Receive the next verdict. Returns `None` once the feed has stopped and
    /// all pending verdicts were consumed.
    pub async fn next_verdict(&mut self) -> Option<ListingVerdict> {
        self.verdict_rx.recv().await
    }

    /// Request shutdown. Pending verdicts can still be drained.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Replace the active filter. Every tracked listing is re-evaluated.
    pub fn update_filter(&self, filter: ActiveFilter) {
        let _ = self.filter_tx.send(filter);
    }

    pub fn set_show_description_on_join(&self, enabled: bool) {
        self.show_description_on_join.store(enabled, Ordering::Relaxed);
    }

    pub fn metrics(&self) -> FeedMetrics {
        self.metrics.snapshot()
    }
}

// ---------------------------------------------------------------------------
// Feed task
// ---------------------------------------------------------------------------

struct FeedTask {
    game_data: Arc<dyn GameData>,
    sink: Option<Arc<dyn NotificationSink>>,
    metrics: MetricsHandle,
    show_description_on_join: Arc<AtomicBool>,
    tracked: BTreeMap<ListingId, Listing>,
}

impl FeedTask {
    async fn run(
        mut self,
        mut source_rx: mpsc::Receiver<ListingEvent>,
        verdict_tx: mpsc::Sender<ListingVerdict>,
        mut filter_rx: watch::Receiver<ActiveFilter>,
        shutdown: CancellationToken,
    ) {
        let mut filter = filter_rx.borrow_and_update().clone();
        info!(active = filter.is_active(), "listing feed started");

        loop {
            tokio::select! {
                event = source_rx.recv() => {
                    let Some(event) = event else { break };
                    if self.handle_event(event, &filter, &verdict_tx).await.is_err() {
                        break;
                    }
                }
                result = filter_rx.changed() => {
                    // the handle was dropped
                    if result.is_err() {
                        break;
                    }
                    filter = filter_rx.borrow_and_update().clone();
                    if self.refresh(&filter, &verdict_tx).await.is_err() {
                        break;
                    }
                }
                _ = shutdown.cancelled() => break,
            }
        }

        info!(tracked = self.tracked.len(), "listing feed stopped");
    }

    async fn handle_event(
        &mut self,
        event: ListingEvent,
        filter: &ActiveFilter,
        verdict_tx: &mpsc::Sender<ListingVerdict>,
    ) -> Result<(), Closed> {
        match event {
            ListingEvent::Received(listing) => {
                self.metrics.inc_listings_received();
                let verdict = self.evaluate(&listing, filter, true);
                self.tracked.insert(listing.id, listing);
                self.metrics.set_tracked_listings(self.tracked.len() as u64);
                verdict_tx.send(verdict).await.map_err(|_| Closed)?;
            }
            ListingEvent::Withdrawn(id) => {
                self.tracked.remove(&id);
                self.metrics.set_tracked_listings(self.tracked.len() as u64);
            }
            ListingEvent::Joined(listing) => {
                if self.show_description_on_join.load(Ordering::Relaxed) {
                    self.notify(join_notice(&listing));
                }
            }
            ListingEvent::Cleared => {
                self.tracked.clear();
                self.metrics.set_tracked_listings(0);
            }
        }
        Ok(())
    }

    /// Re-evaluate every tracked listing. Highlights are not re-sent.
    async fn refresh(
        &self,
        filter: &ActiveFilter,
        verdict_tx: &mpsc::Sender<ListingVerdict>,
    ) -> Result<(), Closed> {
        self.metrics.inc_refreshes();
        debug!(
            tracked = self.tracked.len(),
            active = filter.is_active(),
            "refreshing listings"
        );
        for listing in self.tracked.values() {
            let mut verdict = self.evaluate(listing, filter, false);
            verdict.refresh = true;
            verdict_tx.send(verdict).await.map_err(|_| Closed)?;
        }
        Ok(())
    }

    fn evaluate(&self, listing: &Listing, filter: &ActiveFilter, notify: bool) -> ListingVerdict {
        let decision = filter.evaluate(listing, self.game_data.as_ref());
        let visible = decision.is_visible();
        let reason = decision.hide_reason();
        self.metrics.record_verdict(visible);

        if let Some(reason) = reason {
            debug!(listing = listing.id.0, ?reason, "listing hidden");
        }

        if notify && !decision.highlights.is_empty() {
            self.metrics.add_highlights_sent(decision.highlights.len() as u64);
            for m in &decision.highlights {
                self.notify(highlight_notification(m));
            }
        }

        ListingVerdict {
            listing_id: listing.id,
            visible,
            reason,
            refresh: false,
            evaluated_at: Utc::now(),
        }
    }

    fn notify(&self, notification: Notification) {
        if let Some(sink) = &self.sink {
            sink.notify(notification);
        }
    }
}

/// The verdict receiver was dropped.
struct Closed;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::filter::evaluate::EvalContext;
    use crate::filter::preset::{Preset, TermKind};
    use crate::notify::{ChannelSink, NotificationKind};

    fn show_all() -> ActiveFilter {
        ActiveFilter::new(Some(Preset::create()), EvalContext::default())
    }

    fn hide_all() -> ActiveFilter {
        let mut p = Preset::create();
        p.categories.clear();
        ActiveFilter::new(Some(p), EvalContext::default())
    }

    /// A listing in the `None` category, so it needs no duty rows.
    fn listing(id: u32, description: &str) -> Listing {
        let mut l = Listing::test_default(id, "Alice", 0);
        l.duty_type = crate::domain::DutyType::Other;
        l.description = description.into();
        l
    }

    fn spawn(rx: mpsc::Receiver<ListingEvent>, filter: ActiveFilter) -> ListingFeed {
        ListingFeedBuilder::new()
            .source(rx)
            .filter(filter)
            .build()
            .unwrap()
    }

    async fn send(tx: &mpsc::Sender<ListingEvent>, event: ListingEvent) {
        tx.send(event).await.unwrap();
    }

    async fn recv(feed: &mut ListingFeed) -> ListingVerdict {
        tokio::time::timeout(Duration::from_secs(2), feed.next_verdict())
            .await
            .expect("verdict within timeout")
            .expect("feed still running")
    }

    #[test]
    fn no_source_error() {
        let result = ListingFeedBuilder::new().build();
        assert!(matches!(result, Err(FeedError::NoSource)));
    }

    #[test]
    fn builder_defaults() {
        let builder = ListingFeedBuilder::new();
        assert_eq!(builder.verdict_channel_capacity, 256);
        assert!(!builder.show_description_on_join);
        assert!(!builder.filter.is_active());
    }

    #[tokio::test]
    async fn no_preset_shows_listing() {
        let (tx, rx) = mpsc::channel(8);
        let mut feed = ListingFeedBuilder::new().source(rx).build().unwrap();
        send(&tx, ListingEvent::Received(listing(1, ""))).await;
        let v = recv(&mut feed).await;
        assert!(v.visible);
        assert_eq!(v.reason, None);
        assert!(!v.refresh);
        feed.shutdown();
    }

    #[tokio::test]
    async fn filter_update_refreshes_tracked_listings() {
        let (tx, rx) = mpsc::channel(8);
        let mut feed = spawn(rx, show_all());

        send(&tx, ListingEvent::Received(listing(2, ""))).await;
        send(&tx, ListingEvent::Received(listing(1, ""))).await;
        assert!(recv(&mut feed).await.visible);
        assert!(recv(&mut feed).await.visible);

        feed.update_filter(hide_all());
        let a = recv(&mut feed).await;
        let b = recv(&mut feed).await;
        assert!(a.refresh && b.refresh);
        assert!(!a.visible && !b.visible);
        assert_eq!((a.listing_id, b.listing_id), (ListingId(1), ListingId(2)));

        let snap = feed.metrics();
        assert_eq!(snap.refreshes, 1);
        assert_eq!(snap.tracked_listings, 2);
        assert_eq!(snap.listings_hidden, 2);
        feed.shutdown();
    }

    #[tokio::test]
    async fn withdrawn_listing_is_not_refreshed() {
        let (tx, rx) = mpsc::channel(8);
        let mut feed = spawn(rx, show_all());

        send(&tx, ListingEvent::Received(listing(1, ""))).await;
        send(&tx, ListingEvent::Received(listing(2, ""))).await;
        recv(&mut feed).await;
        recv(&mut feed).await;
        send(&tx, ListingEvent::Withdrawn(ListingId(1))).await;
        // an event after the withdrawal proves it was processed
        send(&tx, ListingEvent::Received(listing(3, ""))).await;
        recv(&mut feed).await;

        feed.update_filter(hide_all());
        let first = recv(&mut feed).await.listing_id;
        let second = recv(&mut feed).await.listing_id;
        assert_eq!([first, second], [ListingId(2), ListingId(3)]);
        feed.shutdown();
    }

    #[tokio::test]
    async fn cleared_releases_tracked_listings() {
        let (tx, rx) = mpsc::channel(8);
        let mut feed = spawn(rx, show_all());

        send(&tx, ListingEvent::Received(listing(1, ""))).await;
        send(&tx, ListingEvent::Received(listing(2, ""))).await;
        recv(&mut feed).await;
        recv(&mut feed).await;
        assert_eq!(feed.metrics().tracked_listings, 2);

        send(&tx, ListingEvent::Cleared).await;
        send(&tx, ListingEvent::Received(listing(3, ""))).await;
        recv(&mut feed).await;
        assert_eq!(feed.metrics().tracked_listings, 1);

        feed.update_filter(hide_all());
        assert_eq!(recv(&mut feed).await.listing_id, ListingId(3));
        feed.shutdown();
    }

    #[tokio::test]
    async fn highlights_reach_sink_once() {
        let (tx, rx) = mpsc::channel(8);
        let (sink, mut notes) = ChannelSink::new();
        let mut p = Preset::create();
        p.add_term(TermKind::Highlight, "savage").unwrap();
        let mut feed = ListingFeedBuilder::new()
            .source(rx)
            .filter(ActiveFilter::new(Some(p), EvalContext::default()))
            .sink(Arc::new(sink))
            .build()
            .unwrap();

        send(&tx, ListingEvent::Received(listing(7, "Savage prog"))).await;
        recv(&mut feed).await;
        let n = notes.recv().await.unwrap();
        assert_eq!(n.kind, NotificationKind::Highlight);
        assert_eq!(n.listing_id, ListingId(7));

        feed.update_filter(show_all());
        recv(&mut feed).await;
        assert!(notes.try_recv().is_err());
        assert_eq!(feed.metrics().highlights_sent, 1);
        feed.shutdown();
    }

    #[tokio::test]
    async fn join_notice_follows_setting() {
        let (tx, rx) = mpsc::channel(8);
        let (sink, mut notes) = ChannelSink::new();
        let mut feed = ListingFeedBuilder::new()
            .source(rx)
            .sink(Arc::new(sink))
            .build()
            .unwrap();

        send(&tx, ListingEvent::Joined(listing(1, "first"))).await;
        send(&tx, ListingEvent::Received(listing(3, ""))).await;
        recv(&mut feed).await;

        feed.set_show_description_on_join(true);
        send(&tx, ListingEvent::Joined(listing(2, "second"))).await;
        send(&tx, ListingEvent::Received(listing(4, ""))).await;
        recv(&mut feed).await;

        let n = notes.recv().await.unwrap();
        assert_eq!(n.kind, NotificationKind::JoinDescription);
        assert_eq!(n.text, "Listing description: second");
        assert!(notes.try_recv().is_err());
        feed.shutdown();
    }

    #[tokio::test]
    async fn shutdown_ends_verdict_stream() {
        let (_tx, rx) = mpsc::channel::<ListingEvent>(8);
        let mut feed = ListingFeedBuilder::new().source(rx).build().unwrap();
        feed.shutdown();
        assert!(feed.is_shutdown());
        let end = tokio::time::timeout(Duration::from_secs(2), feed.next_verdict()).await;
        assert_eq!(end.unwrap(), None);
    }

    #[tokio::test]
    async fn closed_source_ends_verdict_stream() {
        let (tx, rx) = mpsc::channel::<ListingEvent>(8);
        let mut feed = ListingFeedBuilder::new().source(rx).build().unwrap();
        drop(tx);
        let end = tokio::time::timeout(Duration::from_secs(2), feed.next_verdict()).await;
        assert_eq!(end.unwrap(), None);
    }
}
