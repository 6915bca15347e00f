use super::predicate::{FeedPredicate, FeedSort};
use super::validation::PageRequest;
use crate::entities::ListingSummary;
use crate::store::{FeedIndexStore, StoreError};
use std::sync::Arc;
use tracing::debug;

/// One page of the feed together with everything a caller needs to render
/// pagination controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedView {
    pub items: Vec<ListingSummary>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    /// Echo of the filters that were applied.
    pub filters: FeedPredicate,
    pub sort: FeedSort,
}

/// `ceil(total_count / page_size)`; zero when nothing matches.
pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Turns a validated predicate and page into a store query.
#[derive(Clone)]
pub struct FeedQueryEngine {
    store: Arc<dyn FeedIndexStore>,
}

impl FeedQueryEngine {
    pub fn new(store: Arc<dyn FeedIndexStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        predicate: FeedPredicate,
        page: PageRequest,
    ) -> Result<FeedView, StoreError> {
        let sort = FeedSort::NEWEST_FIRST;
        let result = self
            .store
            .query(&predicate, sort, page.skip(), page.limit())
            .await?;

        debug!(
            tag = ?predicate.tag,
            min_price = ?predicate.min_price,
            max_price = ?predicate.max_price,
            page = page.page(),
            page_size = page.page_size(),
            returned = result.items.len(),
            total = result.total,
            "Executed feed query"
        );

        Ok(FeedView {
            items: result.items,
            total_count: result.total,
            page: page.page(),
            page_size: page.page_size(),
            total_pages: total_pages(result.total, page.page_size()),
            filters: predicate,
            sort,
        })
    }
}
