use super::{FeedIndexStore, StoreError};
use crate::entities::{ListingId, ListingSummary, ListingSummaryPage};
use crate::query::{FeedPredicate, FeedSort, SortDirection};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-process feed index.
///
/// Keeps the summaries in a map with two secondary indexes: an ordered set of
/// `(created_at, id)` for chronological scans and a tag posting list. Price
/// bounds are checked during the scan.
#[derive(Debug, Default)]
pub struct MemoryFeedIndex {
    inner: RwLock<Indexes>,
}

#[derive(Debug, Default)]
struct Indexes {
    documents: HashMap<ListingId, ListingSummary>,
    chronological: BTreeSet<(OffsetDateTime, ListingId)>,
    by_tag: HashMap<String, HashSet<ListingId>>,
}

impl Indexes {
    fn insert(&mut self, summary: ListingSummary) {
        for tag in &summary.tags {
            self.by_tag.entry(tag.clone()).or_default().insert(summary.id);
        }
        self.chronological.insert(summary.sort_key());
        self.documents.insert(summary.id, summary);
    }

    fn take(&mut self, id: ListingId) -> Option<ListingSummary> {
        let summary = self.documents.remove(&id)?;
        self.chronological.remove(&summary.sort_key());
        for tag in &summary.tags {
            if let Some(ids) = self.by_tag.get_mut(tag) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.by_tag.remove(tag);
                }
            }
        }
        Some(summary)
    }
}

impl MemoryFeedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, id: ListingId) -> Option<ListingSummary> {
        self.inner.read().await.documents.get(&id).cloned()
    }
}

#[async_trait]
impl FeedIndexStore for MemoryFeedIndex {
    async fn upsert(&self, mut summary: ListingSummary) -> Result<(), StoreError> {
        let mut indexes = self.inner.write().await;
        if let Some(previous) = indexes.take(summary.id) {
            summary.created_at = previous.created_at;
        }
        indexes.insert(summary);
        Ok(())
    }

    async fn remove(&self, id: ListingId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.take(id).is_some())
    }

    async fn exists(&self, id: ListingId) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.documents.contains_key(&id))
    }

    async fn query(
        &self,
        predicate: &FeedPredicate,
        sort: FeedSort,
        skip: u64,
        limit: u64,
    ) -> Result<ListingSummaryPage, StoreError> {
        let indexes = self.inner.read().await;

        let tagged = match &predicate.tag {
            Some(tag) => match indexes.by_tag.get(tag) {
                Some(ids) => Some(ids),
                None => return Ok(ListingSummaryPage::default()),
            },
            None => None,
        };

        let ordered: Box<dyn Iterator<Item = &(OffsetDateTime, ListingId)> + '_> =
            match sort.direction {
                SortDirection::Descending => Box::new(indexes.chronological.iter().rev()),
                SortDirection::Ascending => Box::new(indexes.chronological.iter()),
            };

        let mut page = ListingSummaryPage::default();
        for (_, id) in ordered {
            if tagged.is_some_and(|ids| !ids.contains(id)) {
                continue;
            }
            let Some(summary) = indexes.documents.get(id) else {
                continue;
            };
            if !predicate.matches(summary) {
                continue;
            }
            if page.total >= skip && (page.items.len() as u64) < limit {
                page.items.push(summary.clone());
            }
            page.total += 1;
        }
        Ok(page)
    }
}
