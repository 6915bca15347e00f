//! Event type definitions.

use crate::entities::ListingId;
use swapit_feed_sdk::objects::{
    FeedUpdatedPayload, ListingEventPayload, from_unix_millis, to_unix_millis,
};
use time::OffsetDateTime;

pub use swapit_feed_sdk::objects::ListingEventKind;

/// A lifecycle change reported by the listing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEvent {
    pub kind: ListingEventKind,
    pub listing_id: ListingId,
    /// When the listing service emitted the event.
    pub timestamp: OffsetDateTime,
}

impl ListingEvent {
    pub fn new(kind: ListingEventKind, listing_id: ListingId) -> Self {
        Self {
            kind,
            listing_id,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn created(listing_id: ListingId) -> Self {
        Self::new(ListingEventKind::Created, listing_id)
    }

    pub fn updated(listing_id: ListingId) -> Self {
        Self::new(ListingEventKind::Updated, listing_id)
    }

    pub fn withdrawn(listing_id: ListingId) -> Self {
        Self::new(ListingEventKind::Withdrawn, listing_id)
    }

    pub fn sold(listing_id: ListingId) -> Self {
        Self::new(ListingEventKind::Sold, listing_id)
    }
}

impl TryFrom<ListingEventPayload> for ListingEvent {
    type Error = time::error::ComponentRange;

    fn try_from(payload: ListingEventPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: payload.kind,
            listing_id: payload.listing_id,
            timestamp: from_unix_millis(payload.timestamp)?,
        })
    }
}

/// Coarse "something in the feed changed" signal. Not a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUpdated {
    pub timestamp: OffsetDateTime,
    pub message: String,
}

impl FeedUpdated {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            message: message.into(),
        }
    }
}

impl From<&FeedUpdated> for FeedUpdatedPayload {
    fn from(value: &FeedUpdated) -> Self {
        Self {
            timestamp: to_unix_millis(value.timestamp),
            message: value.message.clone(),
        }
    }
}
