use super::{ListingSource, SourceError};
use crate::config::ListingSourceConfig;
use crate::entities::ListingId;
use async_trait::async_trait;
use reqwest::StatusCode;
use swapit_feed_sdk::objects::ListingSnapshot;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

/// Listing store reached over HTTP at `GET {base_url}/listings/{id}`.
///
/// Every request is bounded by the configured timeout, so a hung listing store
/// turns into a `SourceError::Request` instead of a stuck handler.
#[derive(Debug)]
pub struct HttpListingSource {
    endpoint: RwLock<Endpoint>,
}

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: Url,
    http_client: reqwest::Client,
}

impl Endpoint {
    fn new(config: &ListingSourceConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            http_client,
        })
    }

    fn listing_url(&self, id: ListingId) -> Result<Url, SourceError> {
        // Joining a relative path keeps any prefix in base_url as long as it
        // ends with a slash.
        Ok(self.base_url.join(&format!("listings/{id}"))?)
    }
}

impl HttpListingSource {
    pub fn new(config: &ListingSourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            endpoint: RwLock::new(Endpoint::new(config)?),
        })
    }

    /// Point at a new base URL and timeout. In-flight requests finish against
    /// the old endpoint. On error the old endpoint stays in place.
    pub async fn reconfigure(&self, config: &ListingSourceConfig) -> Result<(), SourceError> {
        let endpoint = Endpoint::new(config)?;
        *self.endpoint.write().await = endpoint;
        info!(
            base_url = %config.base_url,
            timeout = ?config.timeout,
            "Listing source reconfigured"
        );
        Ok(())
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn get_listing(&self, id: ListingId) -> Result<ListingSnapshot, SourceError> {
        let endpoint = self.endpoint.read().await.clone();
        let url = endpoint.listing_url(id)?;
        let response = endpoint.http_client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SourceError::NotFound(id)),
            status if status.is_success() => {
                let snapshot: ListingSnapshot = response.json().await?;
                debug!(listing_id = %id, status = %snapshot.status, "Fetched listing snapshot");
                Ok(snapshot)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SourceError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
