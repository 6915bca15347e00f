//! Event types and channels for the feed pipeline.
//!
//! # Event Flow
//!
//! 1. Listing service → `POST /api/v1/events/listings` → `ListingEvent` channel
//! 2. `FeedSynchronizer` consumes `ListingEvent`, writes the index, emits `FeedUpdated`
//! 3. `FeedUpdated` is broadcast to WebSocket subscribers and anyone else listening
//!
//! Listing events carry identifiers only. The synchronizer re-fetches the
//! listing before writing, so replaying an event is always safe.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, FEED_UPDATED_BUFFER, FeedUpdatedReceiver, FeedUpdatedSender,
    ListingEventReceiver, ListingEventSender, feed_updated_channel, listing_event_channel,
};
pub use types::{FeedUpdated, ListingEvent, ListingEventKind};
