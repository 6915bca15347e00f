pub mod listing_summary;

pub use listing_summary::{ListingSummary, ListingSummaryPage, Price, SnapshotError};

/// Listing ids are assigned by the listing service and reused verbatim as the
/// feed's primary key.
pub type ListingId = uuid::Uuid;

/// Opaque seller id, carried through for display only.
pub type SellerId = uuid::Uuid;
