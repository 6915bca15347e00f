//! The read surface of the feed.
//!
//! Every operation validates its arguments before it touches storage, so an
//! invalid call never costs a query.

use crate::events::{FeedUpdated, FeedUpdatedReceiver, FeedUpdatedSender};
use crate::query::{
    FeedPredicate, FeedQueryEngine, FeedView, PageRequest, ValidationError,
    validate_price_bounds, validate_tag,
};
use crate::store::{FeedIndexStore, StoreError};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("feed storage failure: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Clone)]
pub struct Feed {
    engine: FeedQueryEngine,
    feed_updated_tx: FeedUpdatedSender,
}

impl Feed {
    pub fn new(store: Arc<dyn FeedIndexStore>, feed_updated_tx: FeedUpdatedSender) -> Self {
        Self {
            engine: FeedQueryEngine::new(store),
            feed_updated_tx,
        }
    }

    /// Newest active listings. `page` defaults to the first page.
    pub async fn get_latest(
        &self,
        page_size: i64,
        page: Option<i64>,
    ) -> Result<FeedView, FeedError> {
        let page = page_request(page_size, page)?;
        Ok(self.engine.execute(FeedPredicate::unfiltered(), page).await?)
    }

    pub async fn filter_by_tag(
        &self,
        tag: &str,
        page_size: i64,
        page: Option<i64>,
    ) -> Result<FeedView, FeedError> {
        let tag = validate_tag(tag)?;
        let page = page_request(page_size, page)?;
        let predicate = FeedPredicate {
            tag: Some(tag),
            ..FeedPredicate::default()
        };
        Ok(self.engine.execute(predicate, page).await?)
    }

    /// At least one bound is required. Bounds are inclusive.
    pub async fn filter_by_price(
        &self,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        page_size: i64,
        page: Option<i64>,
    ) -> Result<FeedView, FeedError> {
        if min_price.is_none() && max_price.is_none() {
            return Err(ValidationError::MissingPriceBound.into());
        }
        validate_price_bounds(min_price, max_price)?;
        let page = page_request(page_size, page)?;
        let predicate = FeedPredicate {
            tag: None,
            min_price,
            max_price,
        };
        Ok(self.engine.execute(predicate, page).await?)
    }

    /// Any subset of the filters; with none it behaves like [`get_latest`](Self::get_latest).
    pub async fn filter_by_combined(
        &self,
        tag: Option<&str>,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        page_size: i64,
        page: Option<i64>,
    ) -> Result<FeedView, FeedError> {
        let tag = tag.map(validate_tag).transpose()?;
        validate_price_bounds(min_price, max_price)?;
        let page = page_request(page_size, page)?;
        let predicate = FeedPredicate {
            tag,
            min_price,
            max_price,
        };
        Ok(self.engine.execute(predicate, page).await?)
    }

    /// Tell subscribers to re-read the feed. The index is not touched.
    pub fn refresh_feed(&self) -> FeedUpdated {
        let update = FeedUpdated::now("feed refresh requested");
        let receivers = self.feed_updated_tx.send(update.clone()).unwrap_or(0);
        info!(receivers, "Broadcast manual feed refresh");
        update
    }

    pub fn subscribe(&self) -> FeedUpdatedReceiver {
        self.feed_updated_tx.subscribe()
    }
}

fn page_request(page_size: i64, page: Option<i64>) -> Result<PageRequest, ValidationError> {
    PageRequest::new(page_size, page.unwrap_or(PageRequest::FIRST_PAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::feed_updated_channel;
    use crate::store::MemoryFeedIndex;

    fn feed() -> Feed {
        Feed::new(Arc::new(MemoryFeedIndex::new()), feed_updated_channel())
    }

    #[tokio::test]
    async fn test_invalid_page_size_is_rejected() {
        let err = feed().get_latest(0, None).await.unwrap_err();
        assert!(matches!(
            err,
            FeedError::InvalidInput(ValidationError::InvalidPageSize(0))
        ));
    }

    #[tokio::test]
    async fn test_price_filter_needs_a_bound() {
        let err = feed().filter_by_price(None, None, 10, None).await.unwrap_err();
        assert!(matches!(
            err,
            FeedError::InvalidInput(ValidationError::MissingPriceBound)
        ));
    }

    #[tokio::test]
    async fn test_blank_tag_is_rejected() {
        let err = feed().filter_by_tag("   ", 10, None).await.unwrap_err();
        assert!(matches!(err, FeedError::InvalidInput(ValidationError::EmptyTag)));
    }

    #[tokio::test]
    async fn test_tag_is_trimmed_in_echoed_filters() {
        let view = feed().filter_by_tag("  books ", 10, None).await.unwrap();
        assert_eq!(view.filters.tag.as_deref(), Some("books"));
        assert_eq!(view.page, 1);
    }

    #[tokio::test]
    async fn test_refresh_notifies_subscribers() {
        let feed = feed();
        let mut rx = feed.subscribe();
        let sent = feed.refresh_feed();
        assert_eq!(rx.recv().await.unwrap(), sent);
    }
}
