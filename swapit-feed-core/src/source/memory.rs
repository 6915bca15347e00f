use super::{ListingSource, SourceError};
use crate::entities::ListingId;
use async_trait::async_trait;
use std::collections::HashMap;
use swapit_feed_sdk::objects::{ListingSnapshot, ListingStatus};
use tokio::sync::RwLock;

/// Listing store held in memory, for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryListingSource {
    listings: RwLock<HashMap<ListingId, ListingSnapshot>>,
}

impl MemoryListingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, snapshot: ListingSnapshot) {
        self.listings.write().await.insert(snapshot.id, snapshot);
    }

    pub async fn delete(&self, id: ListingId) {
        self.listings.write().await.remove(&id);
    }

    /// Change the status of a stored listing. Returns `false` if it is unknown.
    pub async fn set_status(&self, id: ListingId, status: ListingStatus) -> bool {
        match self.listings.write().await.get_mut(&id) {
            Some(listing) => {
                listing.status = status;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ListingSource for MemoryListingSource {
    async fn get_listing(&self, id: ListingId) -> Result<ListingSnapshot, SourceError> {
        self.listings
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SourceError::NotFound(id))
    }
}
