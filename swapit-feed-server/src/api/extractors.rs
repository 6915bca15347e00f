//! Custom Axum extractors.
//!
//! Provides:
//! - `SignedBody<T>` – verifies the `SwapIt-Signature` header against a signed JSON body
//!   (used by event ingress).
//! - `FeedParams` – feed query parameters, rejecting unparsable values as invalid input.
//!
//! All cryptographic operations are delegated to [`swapit_feed_sdk::signature`].

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use swapit_feed_core::query::ValidationError;
use swapit_feed_sdk::objects::FeedQuery;
use swapit_feed_sdk::signature::{SIGNATURE_HEADER, Signature, SignatureError, SignedObject};

use super::ApiError;
use crate::state::AppState;

/// Upper bound on a signed event body.
const MAX_BODY_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// SignedBody
// ---------------------------------------------------------------------------

/// Verifies the `SwapIt-Signature` header and deserializes the JSON body.
///
/// ```text
/// SwapIt-Signature: {unix_timestamp}.{base64_signature}
/// ```
///
/// The signature is `HMAC-SHA256("{timestamp}.{json_body}", ingest_secret)`.
pub struct SignedBody<T: Signature>(pub T);

#[derive(Debug, thiserror::Error)]
pub enum SignedBodyError {
    #[error("missing SwapIt-Signature header")]
    MissingHeader,
    #[error("invalid SwapIt-Signature header format")]
    InvalidHeader,
    #[error("invalid signature encoding")]
    InvalidBase64,
    #[error("failed to read request body")]
    BodyReadError,
    #[error("invalid JSON body: {0}")]
    JsonError(serde_json::Error),
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("signature expired")]
    Expired,
}

impl From<SignatureError> for SignedBodyError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::InvalidFormat => Self::InvalidHeader,
            SignatureError::InvalidBase64 => Self::InvalidBase64,
            SignatureError::Json(e) => Self::JsonError(e),
            SignatureError::SignatureMismatch => Self::VerificationFailed,
            SignatureError::Expired => Self::Expired,
        }
    }
}

impl IntoResponse for SignedBodyError {
    fn into_response(self) -> Response {
        let status = match self {
            SignedBodyError::MissingHeader
            | SignedBodyError::VerificationFailed
            | SignedBodyError::Expired => StatusCode::UNAUTHORIZED,
            SignedBodyError::InvalidHeader
            | SignedBodyError::InvalidBase64
            | SignedBodyError::BodyReadError
            | SignedBodyError::JsonError(_) => StatusCode::BAD_REQUEST,
        };
        tracing::debug!(error = %self, "Rejected signed body");
        (status, self.to_string()).into_response()
    }
}

impl<T: Signature + Send> FromRequest<AppState> for SignedBody<T> {
    type Rejection = SignedBodyError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = req
            .headers()
            .get(SIGNATURE_HEADER)
            .ok_or(SignedBodyError::MissingHeader)?
            .to_str()
            .map_err(|_| SignedBodyError::InvalidHeader)?
            .to_owned();

        let body_bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| SignedBodyError::BodyReadError)?;

        let json =
            String::from_utf8(body_bytes.to_vec()).map_err(|_| SignedBodyError::BodyReadError)?;

        let signed = SignedObject::<T>::from_header_and_body(&header_value, json)?;

        let ingest = state.config.ingest.read().await;
        let verified_body = signed.verify(ingest.secret_bytes())?;
        drop(ingest);

        Ok(SignedBody(verified_body))
    }
}

// ---------------------------------------------------------------------------
// FeedParams
// ---------------------------------------------------------------------------

/// Feed query string. `page_size=2.5` or `min_price=cheap` become
/// `invalid_input` instead of axum's plain-text rejection.
pub struct FeedParams(pub FeedQuery);

impl<S: Send + Sync> FromRequestParts<S> for FeedParams {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<FeedQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationError::Malformed(rejection.body_text()))?;
        Ok(FeedParams(query))
    }
}
