//! Event processors for the feed pipeline.
//!
//! - `FeedSynchronizer`: Receives `ListingEvent`, writes the feed index, emits `FeedUpdated`

pub mod feed_synchronizer;

pub use feed_synchronizer::{FeedSynchronizer, SkipReason, SyncError, SyncOutcome};
