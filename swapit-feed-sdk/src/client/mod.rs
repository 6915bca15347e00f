//! HTTP clients for the feed server.
//!
//! Gated behind the `client` cargo feature so crates that only need the wire
//! types do not pull in `reqwest`.

mod events;
mod feed;

pub use events::EventClient;
pub use feed::FeedClient;

use reqwest::StatusCode;

use crate::signature::SignatureError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to feed server failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("could not sign event: {0}")]
    Signature(#[from] SignatureError),

    /// Non-2xx answer; `body` is usually an `ErrorResponse`.
    #[error("feed server answered {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad feed server url: {0}")]
    Url(#[from] url::ParseError),

    /// The base URL scheme has no WebSocket counterpart.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    match resp.status() {
        status if status.is_success() => Ok(resp),
        status => Err(ClientError::Api {
            status,
            body: resp.text().await.unwrap_or_default(),
        }),
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let bytes = check_status(resp).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
