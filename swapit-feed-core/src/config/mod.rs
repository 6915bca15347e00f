//! Runtime configuration types.
//!
//! These are the validated values the server works with. Loading and parsing
//! the TOML file is the server crate's job.

mod feed;
mod ingest;
mod listing_source;
mod server;

pub use feed::FeedConfig;
pub use ingest::IngestConfig;
pub use listing_source::ListingSourceConfig;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each reloadable section.
///
/// Sections can be swapped independently on reload without blocking readers
/// of the others. The listen address is not here: it is bound once at startup.
#[derive(Clone)]
pub struct SharedConfig {
    /// Secret the listing service signs events with.
    pub ingest: Arc<RwLock<IngestConfig>>,
    pub listing_source: Arc<RwLock<ListingSourceConfig>>,
    pub feed: Arc<RwLock<FeedConfig>>,
}

impl SharedConfig {
    pub fn new(
        ingest: IngestConfig,
        listing_source: ListingSourceConfig,
        feed: FeedConfig,
    ) -> Self {
        Self {
            ingest: Arc::new(RwLock::new(ingest)),
            listing_source: Arc::new(RwLock::new(listing_source)),
            feed: Arc::new(RwLock::new(feed)),
        }
    }
}
