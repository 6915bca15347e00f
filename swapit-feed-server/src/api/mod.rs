//! HTTP API.
//!
//! - `/api/v1/feed`   – public feed reads and the update stream
//! - `/api/v1/events` – signed listing events from the listing service

pub mod events;
pub mod extractors;
pub mod feed;
mod feed_ws;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use swapit_feed_core::facade::FeedError;
use swapit_feed_core::query::ValidationError;
use swapit_feed_core::store::StoreError;
use swapit_feed_sdk::objects::ErrorResponse;

/// Errors surfaced by the feed API as `{ "error": kind, "message": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// The synchronizer cannot take more events right now.
    #[error("{0}")]
    Unavailable(&'static str),
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::InvalidInput(e) => ApiError::InvalidInput(e),
            FeedError::Storage(e) => ApiError::Storage(e),
        }
    }
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::Storage(_) => "storage_unavailable",
            ApiError::Unavailable(_) => "unavailable",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "Feed storage error");
                "feed storage is unavailable".to_owned()
            }
            ApiError::Unavailable(reason) => {
                tracing::warn!(reason, "Rejecting request");
                self.to_string()
            }
            ApiError::InvalidInput(e) => e.to_string(),
        };
        let body = ErrorResponse {
            error: self.kind().to_owned(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}
