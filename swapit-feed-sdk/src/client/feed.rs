//! Feed read API client.

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use rust_decimal::Decimal;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::ws::WsServerMessage;
use crate::objects::{FeedQuery, FeedUpdatedPayload, FeedViewResponse};

/// Typed client for `/api/v1/feed`. The read API is unauthenticated.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
    base_url: Url,
}

impl FeedClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` (e.g. to configure timeouts).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/v1/feed/latest`
    pub async fn get_latest(
        &self,
        page_size: i64,
        page: Option<i64>,
    ) -> Result<FeedViewResponse, ClientError> {
        let query = FeedQuery {
            page_size: Some(page_size),
            page,
            ..FeedQuery::default()
        };
        self.get("/api/v1/feed/latest", &query).await
    }

    /// `GET /api/v1/feed/tag`
    pub async fn filter_by_tag(
        &self,
        tag: &str,
        page_size: i64,
        page: Option<i64>,
    ) -> Result<FeedViewResponse, ClientError> {
        let query = FeedQuery {
            page_size: Some(page_size),
            page,
            tag: Some(tag.to_owned()),
            ..FeedQuery::default()
        };
        self.get("/api/v1/feed/tag", &query).await
    }

    /// `GET /api/v1/feed/price`
    pub async fn filter_by_price(
        &self,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        page_size: i64,
        page: Option<i64>,
    ) -> Result<FeedViewResponse, ClientError> {
        let query = FeedQuery {
            page_size: Some(page_size),
            page,
            tag: None,
            min_price,
            max_price,
        };
        self.get("/api/v1/feed/price", &query).await
    }

    /// `GET /api/v1/feed/search` with any combination of filters.
    pub async fn filter_by_combined(
        &self,
        query: &FeedQuery,
    ) -> Result<FeedViewResponse, ClientError> {
        self.get("/api/v1/feed/search", query).await
    }

    /// `POST /api/v1/feed/refresh`
    pub async fn refresh(&self) -> Result<FeedUpdatedPayload, ClientError> {
        let url = self.base_url.join("/api/v1/feed/refresh")?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// Open `GET /api/v1/feed/updates` and yield every message the server pushes.
    ///
    /// The stream ends when the server closes the connection.
    pub async fn subscribe_updates(
        &self,
    ) -> Result<impl Stream<Item = Result<WsServerMessage, ClientError>> + use<>, ClientError> {
        let url = self.updates_url()?;
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        Ok(socket.filter_map(|frame| async move {
            match frame {
                Ok(Message::Text(text)) => {
                    Some(serde_json::from_str::<WsServerMessage>(&text).map_err(ClientError::Json))
                }
                Ok(_) => None,
                Err(e) => Some(Err(ClientError::WebSocket(e))),
            }
        }))
    }

    /// `http(s)://…/api/v1/feed/updates` rewritten to `ws(s)://`.
    fn updates_url(&self) -> Result<Url, ClientError> {
        let mut url = self.base_url.join("/api/v1/feed/updates")?;
        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(ClientError::UnsupportedScheme(other.to_owned())),
        };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::UnsupportedScheme(scheme.to_owned()))?;
        Ok(url)
    }

    async fn get(&self, path: &str, query: &FeedQuery) -> Result<FeedViewResponse, ClientError> {
        let url = self.base_url.join(path)?;
        let resp = self.http.get(url).query(query).send().await?;
        parse_response(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_url_scheme() {
        let client = FeedClient::new(Url::parse("https://feed.swapit.example/").unwrap());
        assert_eq!(
            client.updates_url().unwrap().as_str(),
            "wss://feed.swapit.example/api/v1/feed/updates"
        );

        let client = FeedClient::new(Url::parse("http://127.0.0.1:8080").unwrap());
        assert_eq!(
            client.updates_url().unwrap().as_str(),
            "ws://127.0.0.1:8080/api/v1/feed/updates"
        );
    }

    #[test]
    fn test_updates_url_rejects_other_schemes() {
        let client = FeedClient::new(Url::parse("ftp://feed.swapit.example/").unwrap());
        assert!(matches!(
            client.updates_url(),
            Err(ClientError::UnsupportedScheme(s)) if s == "ftp"
        ));
    }
}
