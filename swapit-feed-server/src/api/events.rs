//! Event ingress.
//!
//! # Endpoints
//!
//! - `POST /listings` – accept a signed `ListingEventPayload` from the listing service
//!
//! Events are queued for the synchronizer and acknowledged with `202 Accepted`
//! before they are applied.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use swapit_feed_core::events::ListingEvent;
use swapit_feed_core::query::ValidationError;
use swapit_feed_sdk::objects::ListingEventPayload;
use tokio::sync::mpsc::error::TrySendError;

use super::ApiError;
use super::extractors::SignedBody;
use crate::state::AppState;

/// Build the event ingress router.
pub fn router() -> Router<AppState> {
    Router::new().route("/listings", post(ingest_listing_event))
}

/// `POST /listings`
async fn ingest_listing_event(
    State(state): State<AppState>,
    SignedBody(payload): SignedBody<ListingEventPayload>,
) -> Result<(StatusCode, Json<ListingEventPayload>), ApiError> {
    let event = ListingEvent::try_from(payload.clone()).map_err(|_| {
        ValidationError::Malformed(format!("timestamp {} out of range", payload.timestamp))
    })?;

    match state.listing_event_tx.try_send(event) {
        Ok(()) => {
            tracing::debug!(
                listing_id = %payload.listing_id,
                kind = %payload.kind,
                "Queued ListingEvent"
            );
            Ok((StatusCode::ACCEPTED, Json(payload)))
        }
        Err(TrySendError::Full(event)) => {
            tracing::warn!(
                listing_id = %event.listing_id,
                kind = %event.kind,
                "ListingEvent queue full"
            );
            Err(ApiError::Unavailable("listing event queue is full"))
        }
        Err(TrySendError::Closed(_)) => {
            Err(ApiError::Unavailable("feed synchronizer is not running"))
        }
    }
}
