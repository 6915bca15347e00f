//! Application state shared across all request handlers.

use crate::config::runtime::SharedConfig;
use swapit_feed_core::events::{FeedUpdatedSender, ListingEventSender};
use swapit_feed_core::facade::Feed;
use tokio::sync::watch;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Read side of the feed.
    pub feed: Feed,
    /// Queue into the synchronizer.
    pub listing_event_tx: ListingEventSender,
    /// Fan-out of feed changes to WebSocket subscribers.
    pub feed_updated_tx: FeedUpdatedSender,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
    /// Flips to `true` once shutdown starts; long-lived connections watch it.
    pub shutdown_rx: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        feed: Feed,
        listing_event_tx: ListingEventSender,
        feed_updated_tx: FeedUpdatedSender,
        config: SharedConfig,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            feed,
            listing_event_tx,
            feed_updated_tx,
            config,
            shutdown_rx,
        }
    }
}
