//! Feed index storage.
//!
//! The index is a dumb store: it applies whatever the synchronizer tells it
//! and answers whatever the query engine asks. It validates nothing.

mod memory;
mod postgres;

pub use memory::MemoryFeedIndex;
pub use postgres::PgFeedIndex;

use crate::entities::{ListingId, ListingSummary, ListingSummaryPage};
use crate::query::{FeedPredicate, FeedSort};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend is up but refusing work (used by non-SQL backends).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent collection of listing summaries keyed by listing id.
///
/// Writes are atomic per summary; there is no multi-summary transaction.
#[async_trait]
pub trait FeedIndexStore: Send + Sync {
    /// Insert or fully replace the summary with the same id.
    /// An existing row keeps its original `created_at`.
    async fn upsert(&self, summary: ListingSummary) -> Result<(), StoreError>;

    /// Remove a summary. Removing an absent id is not an error; returns
    /// whether anything was removed.
    async fn remove(&self, id: ListingId) -> Result<bool, StoreError>;

    async fn exists(&self, id: ListingId) -> Result<bool, StoreError>;

    /// Return `limit` summaries after skipping `skip`, in `sort` order, plus
    /// the total number matching `predicate` regardless of the window.
    async fn query(
        &self,
        predicate: &FeedPredicate,
        sort: FeedSort,
        skip: u64,
        limit: u64,
    ) -> Result<ListingSummaryPage, StoreError>;
}
