//! WebSocket message types for the feed update stream.
//!
//! `GET /api/v1/feed/updates` upgrades to a WebSocket connection and pushes
//! [`WsServerMessage`] JSON frames. The stream never closes on its own; the
//! client decides when to stop listening.

use serde::{Deserialize, Serialize};

use super::events::FeedUpdatedPayload;

/// Server-to-client WebSocket message.
///
/// ```json
/// {"type":"feed_updated","update":{"timestamp":1700000000000,"message":"listing upserted"}}
/// {"type":"lagged","skipped":12}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// The feed changed; clients should re-query.
    FeedUpdated { update: FeedUpdatedPayload },

    /// The connection fell behind and some notifications were dropped.
    /// Clients should treat this like a `FeedUpdated`.
    Lagged { skipped: u64 },
}

/// Well-known WebSocket close codes used by the feed update stream.
pub struct WsCloseCode;

impl WsCloseCode {
    /// The server is shutting down.
    pub const GOING_AWAY: u16 = 1001;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_tagging() {
        let msg = WsServerMessage::Lagged { skipped: 3 };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"lagged","skipped":3}"#
        );
    }
}
