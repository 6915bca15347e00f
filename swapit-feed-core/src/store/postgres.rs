use super::{FeedIndexStore, StoreError};
use crate::entities::listing_summary::{
    DeleteListingSummary, ListingSummaryExists, QueryListingSummaries, UpsertListingSummary,
};
use crate::entities::{ListingId, ListingSummary, ListingSummaryPage};
use crate::framework::DatabaseProcessor;
use crate::query::{FeedPredicate, FeedSort};
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;

/// `feed_listing_summaries` in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgFeedIndex {
    processor: DatabaseProcessor,
}

impl PgFeedIndex {
    pub fn new(pool: PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl FeedIndexStore for PgFeedIndex {
    async fn upsert(&self, summary: ListingSummary) -> Result<(), StoreError> {
        self.processor
            .process(UpsertListingSummary { summary })
            .await?;
        Ok(())
    }

    async fn remove(&self, id: ListingId) -> Result<bool, StoreError> {
        Ok(self.processor.process(DeleteListingSummary { id }).await?)
    }

    async fn exists(&self, id: ListingId) -> Result<bool, StoreError> {
        Ok(self.processor.process(ListingSummaryExists { id }).await?)
    }

    async fn query(
        &self,
        predicate: &FeedPredicate,
        sort: FeedSort,
        skip: u64,
        limit: u64,
    ) -> Result<ListingSummaryPage, StoreError> {
        let page = self
            .processor
            .process(QueryListingSummaries {
                predicate: predicate.clone(),
                sort,
                skip,
                limit,
            })
            .await?;
        Ok(page)
    }
}
