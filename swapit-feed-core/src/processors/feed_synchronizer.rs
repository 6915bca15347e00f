//! FeedSynchronizer processor.
//!
//! The FeedSynchronizer is responsible for:
//! - Receiving `ListingEvent` from the queue
//! - Re-fetching the listing from the authoritative listing store
//! - Upserting or removing its summary in the feed index
//! - Broadcasting `FeedUpdated` whenever the index actually changed
//!
//! Every event is handled in its own task. There is no ordering between
//! events, not even for the same listing, and no lock spans the fetch and the
//! write. Each write is a full replace built from a freshly fetched snapshot,
//! so the last write for a listing wins.
//!
//! A consequence of last-write-wins: if an `Updated` handler fetched the
//! listing while it was still active and its upsert lands after a
//! `Withdrawn` handler removed the summary, the withdrawn listing reappears
//! in the feed. It stays there until the next event for that id is handled.
//! Replaying any event is harmless because the snapshot is always re-read.

use crate::entities::{ListingId, ListingSummary, SnapshotError};
use crate::events::{
    FeedUpdated, FeedUpdatedSender, ListingEvent, ListingEventKind, ListingEventReceiver,
};
use crate::source::{ListingSource, SourceError};
use crate::store::{FeedIndexStore, StoreError};
use kanau::processor::Processor;
use std::sync::Arc;
use swapit_feed_sdk::objects::ListingStatus;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Errors raised while applying a listing event. They never reach the
/// listing service; [`FeedSynchronizer::handle`] logs and drops them.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("listing source error: {0}")]
    Source(#[from] SourceError),

    #[error("feed index error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid listing snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
}

/// Why an event left the index untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The listing store no longer knows the listing.
    NotFound,
    /// The listing exists but is not active.
    Inactive(ListingStatus),
}

/// What applying an event did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Upserted,
    Removed { existed: bool },
    Skipped(SkipReason),
}

impl SyncOutcome {
    /// Whether the feed index changed.
    pub fn changed_index(&self) -> bool {
        match self {
            SyncOutcome::Upserted => true,
            SyncOutcome::Removed { existed } => *existed,
            SyncOutcome::Skipped(_) => false,
        }
    }
}

/// Keeps the feed index in step with the listing store.
#[derive(Clone)]
pub struct FeedSynchronizer {
    store: Arc<dyn FeedIndexStore>,
    source: Arc<dyn ListingSource>,
    feed_updated_tx: FeedUpdatedSender,
}

impl FeedSynchronizer {
    pub fn new(
        store: Arc<dyn FeedIndexStore>,
        source: Arc<dyn ListingSource>,
        feed_updated_tx: FeedUpdatedSender,
    ) -> Self {
        Self {
            store,
            source,
            feed_updated_tx,
        }
    }

    /// Run the synchronizer until shutdown or until every sender is dropped.
    ///
    /// Each event is spawned into a `JoinSet`. On exit the loop stops taking
    /// new events and waits for the in-flight ones.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut event_rx: ListingEventReceiver,
    ) {
        info!("FeedSynchronizer started");
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("FeedSynchronizer received shutdown signal");
                        break;
                    }
                }

                event = event_rx.recv() => match event {
                    Some(event) => {
                        debug!(
                            listing_id = %event.listing_id,
                            kind = %event.kind,
                            "Received ListingEvent"
                        );
                        let synchronizer = self.clone();
                        in_flight.spawn(async move { synchronizer.handle(event).await });
                    }
                    None => {
                        info!("ListingEvent channel closed");
                        break;
                    }
                },

                // Reap finished handlers so the set does not grow unbounded.
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "ListingEvent handler task failed");
                    }
                }
            }
        }

        event_rx.close();
        if !in_flight.is_empty() {
            info!(in_flight = in_flight.len(), "Draining in-flight ListingEvent handlers");
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "ListingEvent handler task failed");
            }
        }

        info!("FeedSynchronizer shutdown complete");
    }

    /// Apply an event and log any failure. Never returns an error.
    pub async fn handle(&self, event: ListingEvent) {
        let listing_id = event.listing_id;
        let kind = event.kind;
        match self.apply(event).await {
            Ok(outcome) => {
                debug!(%listing_id, %kind, ?outcome, "Applied ListingEvent");
            }
            Err(e) => {
                error!(%listing_id, %kind, error = %e, "Failed to apply ListingEvent");
            }
        }
    }

    /// Apply an event to the index, broadcasting `FeedUpdated` if it changed.
    pub async fn apply(&self, event: ListingEvent) -> Result<SyncOutcome, SyncError> {
        let outcome = match event.kind {
            ListingEventKind::Created => self.on_created(event.listing_id).await?,
            ListingEventKind::Updated => self.on_updated(event.listing_id).await?,
            ListingEventKind::Withdrawn | ListingEventKind::Sold => {
                self.remove(event.listing_id).await?
            }
        };

        if outcome.changed_index() {
            self.notify(&event, outcome);
        }
        Ok(outcome)
    }

    async fn on_created(&self, id: ListingId) -> Result<SyncOutcome, SyncError> {
        let snapshot = match self.source.get_listing(id).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_not_found() => {
                warn!(listing_id = %id, "Created listing not found in listing store, dropping event");
                return Ok(SyncOutcome::Skipped(SkipReason::NotFound));
            }
            Err(e) => return Err(e.into()),
        };

        if !snapshot.status.is_active() {
            debug!(listing_id = %id, status = %snapshot.status, "Created listing is not active");
            return Ok(SyncOutcome::Skipped(SkipReason::Inactive(snapshot.status)));
        }

        let summary = ListingSummary::from_snapshot(snapshot, time::OffsetDateTime::now_utc())?;
        self.store.upsert(summary).await?;
        Ok(SyncOutcome::Upserted)
    }

    async fn on_updated(&self, id: ListingId) -> Result<SyncOutcome, SyncError> {
        let snapshot = match self.source.get_listing(id).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_not_found() => {
                debug!(listing_id = %id, "Updated listing no longer exists, removing");
                return self.remove(id).await;
            }
            Err(e) => return Err(e.into()),
        };

        if !snapshot.status.is_active() {
            debug!(listing_id = %id, status = %snapshot.status, "Updated listing is not active, removing");
            return self.remove(id).await;
        }

        let summary = ListingSummary::from_snapshot(snapshot, time::OffsetDateTime::now_utc())?;
        self.store.upsert(summary).await?;
        Ok(SyncOutcome::Upserted)
    }

    async fn remove(&self, id: ListingId) -> Result<SyncOutcome, SyncError> {
        let existed = self.store.remove(id).await?;
        Ok(SyncOutcome::Removed { existed })
    }

    fn notify(&self, event: &ListingEvent, outcome: SyncOutcome) {
        let verb = match outcome {
            SyncOutcome::Upserted => "upserted",
            _ => "removed",
        };
        let update = FeedUpdated::now(format!(
            "listing {} {verb} after {}",
            event.listing_id, event.kind
        ));
        // No subscribers is fine.
        let _ = self.feed_updated_tx.send(update);
    }
}

impl Processor<ListingEvent> for FeedSynchronizer {
    type Output = SyncOutcome;
    type Error = SyncError;

    async fn process(&self, event: ListingEvent) -> Result<SyncOutcome, SyncError> {
        self.apply(event).await
    }
}
