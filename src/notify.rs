//! Outbound notifications.
//!
//! The feed pushes [`Notification`]s into a [`NotificationSink`]: one per
//! matched highlight term, and a description notice when the user joins a
//! listing. Rendering (chat line, link payload, sound) belongs to the sink.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::info;

use crate::model::{HighlightMatch, Listing, ListingId};

/// Sound effect played with a highlight notification.
pub const HIGHLIGHT_SOUND: u32 = 5;

const HIGHLIGHT_HEADER: &str = "A watched listing appeared";
const JOIN_PREFIX: &str = "Listing description: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NotificationKind {
    Highlight,
    JoinDescription,
}

/// A message for the user, carrying enough to link back to the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notification {
    pub kind: NotificationKind,
    pub listing_id: ListingId,
    pub author: String,
    pub description: String,
    /// The highlight term that matched, for highlight notifications.
    pub term: Option<String>,
    /// Rendered text.
    pub text: String,
    pub sound: Option<u32>,
    pub at: DateTime<Utc>,
}

pub fn highlight_notification(m: &HighlightMatch) -> Notification {
    Notification {
        kind: NotificationKind::Highlight,
        listing_id: m.listing_id,
        author: m.author.clone(),
        description: m.description.clone(),
        term: Some(m.term.clone()),
        text: format!("{HIGHLIGHT_HEADER}\n{}: {}", m.author, m.description),
        sound: Some(HIGHLIGHT_SOUND),
        at: Utc::now(),
    }
}

pub fn join_notice(listing: &Listing) -> Notification {
    Notification {
        kind: NotificationKind::JoinDescription,
        listing_id: listing.id,
        author: listing.name.clone(),
        description: listing.description.clone(),
        term: None,
        text: format!("{JOIN_PREFIX}{}", listing.description),
        sound: None,
        at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receives notifications. Must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<F> NotificationSink for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Forwards notifications into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // a dropped receiver only means nobody is listening any more
        let _ = self.tx.send(notification);
    }
}

/// Logs notifications at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        info!(
            kind = ?n.kind,
            listing = n.listing_id.0,
            author = %n.author,
            term = n.term.as_deref().unwrap_or(""),
            sound = n.sound.unwrap_or(0),
            "{}",
            n.text
        );
    }
}
