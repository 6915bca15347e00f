//! Event publishing client, used by the listing service.

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, check_status};
use crate::objects::{ListingEventKind, ListingEventPayload, to_unix_millis};
use crate::signature::{SIGNATURE_HEADER, SignedObject};

/// Pushes signed listing lifecycle events to `POST /api/v1/events/listings`.
///
/// The server acknowledges with `202 Accepted` before the event is processed;
/// a successful publish says nothing about whether the feed has caught up.
#[derive(Debug, Clone)]
pub struct EventClient {
    http: Client,
    base_url: Url,
    secret: Vec<u8>,
}

impl EventClient {
    /// * `base_url` – root URL of the feed server.
    /// * `secret` – the shared HMAC secret configured under `[ingest]`.
    pub fn new(base_url: Url, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            secret: secret.into(),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Publish a single event stamped with the current time.
    pub async fn publish(
        &self,
        kind: ListingEventKind,
        listing_id: Uuid,
    ) -> Result<(), ClientError> {
        let payload = ListingEventPayload {
            kind,
            listing_id,
            timestamp: to_unix_millis(time::OffsetDateTime::now_utc()),
        };
        self.publish_payload(payload).await
    }

    pub async fn publish_payload(&self, payload: ListingEventPayload) -> Result<(), ClientError> {
        let signed = SignedObject::new(payload, &self.secret)?;
        let url = self.base_url.join("/api/v1/events/listings")?;

        let resp = self
            .http
            .post(url)
            .header(SIGNATURE_HEADER, signed.to_header())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(signed.json)
            .send()
            .await?;

        check_status(resp).await?;
        Ok(())
    }
}
