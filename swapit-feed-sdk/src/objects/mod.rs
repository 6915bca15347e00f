pub mod events;
pub mod feed;
pub mod listing;
pub mod ws;

pub use events::{FeedUpdatedPayload, ListingEventKind, ListingEventPayload};
pub use feed::{
    AppliedFiltersResponse, ErrorResponse, FeedQuery, FeedViewResponse, ListingSummaryResponse,
    SortDirection, SortField, SortResponse,
};
pub use listing::{ListingSnapshot, ListingStatus, Price};
pub use ws::{WsCloseCode, WsServerMessage};

/// Convert a timestamp into Unix milliseconds, the resolution used on the wire.
pub fn to_unix_millis(at: time::OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Convert Unix milliseconds back into a UTC timestamp.
pub fn from_unix_millis(millis: i64) -> Result<time::OffsetDateTime, time::error::ComponentRange> {
    time::OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_millis_conversion() {
        let at = from_unix_millis(1_700_000_000_123).unwrap();
        assert_eq!(at.unix_timestamp(), 1_700_000_000);
        assert_eq!(at.millisecond(), 123);
        assert_eq!(to_unix_millis(at), 1_700_000_000_123);
    }

    #[test]
    fn test_out_of_range_millis() {
        assert!(from_unix_millis(i64::MAX).is_err());
    }
}
