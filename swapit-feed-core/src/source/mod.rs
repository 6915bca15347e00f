//! Read-only access to the authoritative listing store.

mod http;
mod memory;

pub use http::HttpListingSource;
pub use memory::MemoryListingSource;

use crate::entities::ListingId;
use async_trait::async_trait;
use swapit_feed_sdk::objects::ListingSnapshot;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The listing store has no listing with this id.
    #[error("listing not found: {0}")]
    NotFound(ListingId),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("listing store returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("listing store unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

/// Fetches the current state of a listing by id.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn get_listing(&self, id: ListingId) -> Result<ListingSnapshot, SourceError>;
}
