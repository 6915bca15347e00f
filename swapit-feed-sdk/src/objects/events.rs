//! Listing lifecycle events and feed notifications.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signature::Signature;

/// The kind of lifecycle change the listing service reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingEventKind {
    #[serde(rename = "listing_created")]
    Created,
    #[serde(rename = "listing_updated")]
    Updated,
    #[serde(rename = "listing_withdrawn")]
    Withdrawn,
    #[serde(rename = "listing_sold")]
    Sold,
}

impl std::fmt::Display for ListingEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingEventKind::Created => write!(f, "listing_created"),
            ListingEventKind::Updated => write!(f, "listing_updated"),
            ListingEventKind::Withdrawn => write!(f, "listing_withdrawn"),
            ListingEventKind::Sold => write!(f, "listing_sold"),
        }
    }
}

/// Body of `POST /api/v1/events/listings`, signed by the listing service.
///
/// Events carry the listing id only; the feed re-fetches the listing itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingEventPayload {
    pub kind: ListingEventKind,
    pub listing_id: Uuid,
    /// Unix timestamp in milliseconds of when the event was emitted.
    pub timestamp: i64,
}

impl Signature for ListingEventPayload {}

/// Coarse "the feed changed" notification. Carries no diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedUpdatedPayload {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_wire_names() {
        let payload = ListingEventPayload {
            kind: ListingEventKind::Withdrawn,
            listing_id: Uuid::nil(),
            timestamp: 1,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "listing_withdrawn");

        let kind: ListingEventKind = serde_json::from_str("\"listing_created\"").unwrap();
        assert_eq!(kind, ListingEventKind::Created);
        assert_eq!(ListingEventKind::Sold.to_string(), "listing_sold");
    }
}
