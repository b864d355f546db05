//! Runtime metrics for the listing feed.
//!
//! [`FeedMetrics`] is a snapshot of counters and gauges that track the feed:
//! listings received, shown and hidden, highlight notifications sent, full
//! refreshes, and the number of listings currently tracked.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared metrics handle, cheaply cloneable.
///
/// Counters use relaxed atomics; exact cross-counter consistency is not
/// needed.
#[derive(Debug, Clone, Default)]
pub struct MetricsHandle {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    listings_received: AtomicU64,
    listings_shown: AtomicU64,
    listings_hidden: AtomicU64,
    highlights_sent: AtomicU64,
    refreshes: AtomicU64,
    tracked_listings: AtomicU64,
}

/// A point-in-time snapshot of feed metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedMetrics {
    pub listings_received: u64,
    /// Verdicts with the listing visible, refreshes included.
    pub listings_shown: u64,
    /// Verdicts with the listing hidden, refreshes included.
    pub listings_hidden: u64,
    pub highlights_sent: u64,
    /// Full re-evaluations triggered by a filter change.
    pub refreshes: u64,
    pub tracked_listings: u64,
}

impl MetricsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_listings_received(&self) {
        self.inner.listings_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one verdict.
    pub fn record_verdict(&self, visible: bool) {
        let counter = if visible {
            &self.inner.listings_shown
        } else {
            &self.inner.listings_hidden
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_highlights_sent(&self, n: u64) {
        self.inner.highlights_sent.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_refreshes(&self) {
        self.inner.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_tracked_listings(&self, n: u64) {
        self.inner.tracked_listings.store(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FeedMetrics {
        FeedMetrics {
            listings_received: self.inner.listings_received.load(Ordering::Relaxed),
            listings_shown: self.inner.listings_shown.load(Ordering::Relaxed),
            listings_hidden: self.inner.listings_hidden.load(Ordering::Relaxed),
            highlights_sent: self.inner.highlights_sent.load(Ordering::Relaxed),
            refreshes: self.inner.refreshes.load(Ordering::Relaxed),
            tracked_listings: self.inner.tracked_listings.load(Ordering::Relaxed),
        }
    }
}
