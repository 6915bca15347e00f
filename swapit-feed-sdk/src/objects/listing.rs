//! Listing snapshots as served by the listing service.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a listing in the listing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Withdrawn,
    Sold,
    Pending,
}

impl ListingStatus {
    /// Only active listings are eligible for the feed.
    pub fn is_active(self) -> bool {
        matches!(self, ListingStatus::Active)
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Active => write!(f, "active"),
            ListingStatus::Withdrawn => write!(f, "withdrawn"),
            ListingStatus::Sold => write!(f, "sold"),
            ListingStatus::Pending => write!(f, "pending"),
        }
    }
}

/// An asking price.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    pub currency: CompactString,
}

/// Full listing as returned by `GET /listings/{id}` on the listing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSnapshot {
    pub id: Uuid,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ListingStatus,
    /// Unix timestamp in milliseconds, assigned once at creation.
    pub created_at: i64,
    pub seller_id: Uuid,
    /// Unix timestamp in milliseconds of the last change in the listing service.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_parsing() {
        let json = r#"{
            "id": "0190f6a0-0000-7000-8000-000000000001",
            "title": "Desk lamp",
            "price": { "amount": "12.50", "currency": "USD" },
            "tags": ["furniture", "lighting"],
            "status": "active",
            "created_at": 1700000000000,
            "seller_id": "0190f6a0-0000-7000-8000-0000000000ff"
        }"#;
        let snapshot: ListingSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.title, "Desk lamp");
        assert_eq!(snapshot.price.amount, Decimal::new(1250, 2));
        assert_eq!(snapshot.price.currency, "USD");
        assert!(snapshot.status.is_active());
        assert_eq!(snapshot.updated_at, None);
    }

    #[test]
    fn test_status_wire_names() {
        let status: ListingStatus = serde_json::from_str("\"withdrawn\"").unwrap();
        assert_eq!(status, ListingStatus::Withdrawn);
        assert!(!status.is_active());
        assert_eq!(ListingStatus::Pending.to_string(), "pending");
    }
}
