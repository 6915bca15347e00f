//! Event channel factories and handles.

use super::types::{FeedUpdated, ListingEvent};
use tokio::sync::{broadcast, mpsc};

/// Buffer for the listing event queue. When it is full, ingress reports the
/// feed as unavailable rather than blocking the listing service.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Buffer for `FeedUpdated` fan-out. Slow subscribers lag instead of
/// blocking the synchronizer.
pub const FEED_UPDATED_BUFFER: usize = 64;

/// Sender handle for ListingEvent events.
pub type ListingEventSender = mpsc::Sender<ListingEvent>;
/// Receiver handle for ListingEvent events.
pub type ListingEventReceiver = mpsc::Receiver<ListingEvent>;

/// Sender handle for FeedUpdated notifications.
pub type FeedUpdatedSender = broadcast::Sender<FeedUpdated>;
/// Receiver handle for FeedUpdated notifications.
pub type FeedUpdatedReceiver = broadcast::Receiver<FeedUpdated>;

/// Create the listing event queue consumed by the synchronizer.
pub fn listing_event_channel() -> (ListingEventSender, ListingEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create the `FeedUpdated` broadcast. Receivers come from
/// [`broadcast::Sender::subscribe`].
pub fn feed_updated_channel() -> FeedUpdatedSender {
    let (tx, _) = broadcast::channel(FEED_UPDATED_BUFFER);
    tx
}
