//! Runtime configuration re-exports.
//!
//! The validated config types live in `swapit-feed-core::config`.

pub use swapit_feed_core::config::{
    FeedConfig, IngestConfig, ListingSourceConfig, ServerConfig, SharedConfig,
};
