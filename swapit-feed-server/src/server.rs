//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/feed", api::feed::router())
        .nest("/api/v1/events", api::events::router())
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server until SIGTERM/SIGINT, then flip `shutdown_tx`.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::{FeedConfig, IngestConfig, ListingSourceConfig, SharedConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::time::Duration;
    use swapit_feed_core::entities::{ListingSummary, ListingSummaryPage, Price};
    use swapit_feed_core::events::{
        FeedUpdatedSender, ListingEventReceiver, ListingEventSender, feed_updated_channel,
        listing_event_channel,
    };
    use swapit_feed_core::facade::Feed;
    use swapit_feed_core::query::{FeedPredicate, FeedSort};
    use swapit_feed_core::store::{FeedIndexStore, MemoryFeedIndex, StoreError};
    use swapit_feed_sdk::objects::{
        ErrorResponse, FeedUpdatedPayload, FeedViewResponse, ListingEventKind,
        ListingEventPayload, SortDirection,
    };
    use swapit_feed_sdk::signature::{SIGNATURE_HEADER, SignedObject};
    use time::OffsetDateTime;
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &[u8] = b"listing-service-secret";

    fn shared_config() -> SharedConfig {
        SharedConfig::new(
            IngestConfig::new(SECRET.to_vec().into_boxed_slice()),
            ListingSourceConfig {
                base_url: "http://listings.invalid/".parse().unwrap(),
                timeout: Duration::from_secs(1),
            },
            FeedConfig {
                default_page_size: 2,
            },
        )
    }

    fn state_with(
        store: Arc<dyn FeedIndexStore>,
        listing_event_tx: ListingEventSender,
        feed_updated_tx: FeedUpdatedSender,
    ) -> AppState {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        AppState::new(
            Feed::new(store, feed_updated_tx.clone()),
            listing_event_tx,
            feed_updated_tx,
            shared_config(),
            shutdown_rx,
        )
    }

    struct TestApp {
        router: Router,
        index: Arc<MemoryFeedIndex>,
        events: ListingEventReceiver,
        updates: FeedUpdatedSender,
    }

    fn app() -> TestApp {
        let index = Arc::new(MemoryFeedIndex::new());
        let (tx, rx) = listing_event_channel();
        let updates = feed_updated_channel();
        TestApp {
            router: build_router(state_with(index.clone(), tx, updates.clone())),
            index,
            events: rx,
            updates,
        }
    }

    fn summary(minute: i64, price: i64, tags: &[&str]) -> ListingSummary {
        let created_at = OffsetDateTime::UNIX_EPOCH + time::Duration::minutes(minute);
        ListingSummary {
            id: Uuid::new_v4(),
            title: format!("listing {minute}"),
            price: Price {
                amount: Decimal::new(price, 0),
                currency: "USD".into(),
            },
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            created_at,
            last_updated_at: created_at,
            seller_id: Uuid::nil(),
        }
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn signed_event_request(payload: ListingEventPayload, key: &[u8]) -> Request<Body> {
        let signed = SignedObject::new(payload, key).unwrap();
        Request::builder()
            .method("POST")
            .uri("/api/v1/events/listings")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, signed.to_header())
            .body(Body::from(signed.json))
            .unwrap()
    }

    fn payload(kind: ListingEventKind) -> ListingEventPayload {
        ListingEventPayload {
            kind,
            listing_id: Uuid::new_v4(),
            timestamp: swapit_feed_sdk::objects::to_unix_millis(OffsetDateTime::now_utc()),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, _) = get(&app.router, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_latest_uses_default_page_size_and_sorts_newest_first() {
        let app = app();
        let old = summary(0, 10, &[]);
        let mid = summary(5, 10, &[]);
        let new = summary(10, 10, &[]);
        for s in [old.clone(), mid.clone(), new.clone()] {
            app.index.upsert(s).await.unwrap();
        }

        let (status, body) = get(&app.router, "/api/v1/feed/latest").await;
        assert_eq!(status, StatusCode::OK);
        let view: FeedViewResponse = serde_json::from_slice(&body).unwrap();
        let ids: Vec<Uuid> = view.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![new.id, mid.id]);
        assert_eq!(view.page_size, 2);
        assert_eq!(view.total_count, 3);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.sort.direction, SortDirection::Desc);
    }

    #[tokio::test]
    async fn test_search_echoes_filters() {
        let app = app();
        let hit = summary(1, 75, &["games"]);
        app.index.upsert(hit.clone()).await.unwrap();
        app.index.upsert(summary(2, 150, &["games"])).await.unwrap();
        app.index.upsert(summary(3, 75, &["books"])).await.unwrap();

        let (status, body) = get(
            &app.router,
            "/api/v1/feed/search?tag=games&min_price=50&max_price=100&page_size=10",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let view: FeedViewResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].id, hit.id);
        assert_eq!(view.filters.tag.as_deref(), Some("games"));
        assert_eq!(view.filters.min_price, Some(Decimal::new(50, 0)));
    }

    #[tokio::test]
    async fn test_invalid_input_is_400() {
        let app = app();
        for uri in [
            "/api/v1/feed/latest?page_size=0",
            "/api/v1/feed/latest?page_size=2.5",
            "/api/v1/feed/latest?page=0",
            "/api/v1/feed/price?page_size=10",
            "/api/v1/feed/tag?tag=%20%20",
            "/api/v1/feed/tag",
            "/api/v1/feed/price?min_price=-1",
        ] {
            let (status, body) = get(&app.router, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(error.error, "invalid_input", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let app = app();
        app.index.upsert(summary(0, 10, &[])).await.unwrap();
        let (status, body) = get(&app.router, "/api/v1/feed/latest?page_size=10&page=4").await;
        assert_eq!(status, StatusCode::OK);
        let view: FeedViewResponse = serde_json::from_slice(&body).unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.total_count, 1);
        assert_eq!(view.page, 4);
    }

    #[tokio::test]
    async fn test_refresh_broadcasts() {
        let app = app();
        let mut rx = app.updates.subscribe();
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/feed/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let returned: FeedUpdatedPayload = serde_json::from_slice(&body).unwrap();
        let sent = rx.recv().await.unwrap();
        assert_eq!(FeedUpdatedPayload::from(&sent), returned);
    }

    #[tokio::test]
    async fn test_signed_event_is_queued() {
        let mut app = app();
        let payload = payload(ListingEventKind::Created);
        let response = app
            .router
            .clone()
            .oneshot(signed_event_request(payload.clone(), SECRET))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let event = app.events.try_recv().unwrap();
        assert_eq!(event.listing_id, payload.listing_id);
        assert_eq!(event.kind, ListingEventKind::Created);
    }

    #[tokio::test]
    async fn test_bad_signature_is_rejected() {
        let mut app = app();
        let response = app
            .router
            .clone()
            .oneshot(signed_event_request(
                payload(ListingEventKind::Sold),
                b"wrong-secret",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(app.events.try_recv().is_err());

        let unsigned = Request::builder()
            .method("POST")
            .uri("/api/v1/events/listings")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.router.clone().oneshot(unsigned).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_full_queue_is_503() {
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        let router = build_router(state_with(
            Arc::new(MemoryFeedIndex::new()),
            tx,
            feed_updated_channel(),
        ));

        let first = router
            .clone()
            .oneshot(signed_event_request(
                payload(ListingEventKind::Updated),
                SECRET,
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::ACCEPTED);

        let second = router
            .oneshot(signed_event_request(
                payload(ListingEventKind::Updated),
                SECRET,
            ))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_closed_queue_is_503() {
        let (tx, rx) = listing_event_channel();
        drop(rx);
        let router = build_router(state_with(
            Arc::new(MemoryFeedIndex::new()),
            tx,
            feed_updated_channel(),
        ));
        let response = router
            .oneshot(signed_event_request(
                payload(ListingEventKind::Withdrawn),
                SECRET,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl FeedIndexStore for BrokenStore {
        async fn upsert(&self, _summary: ListingSummary) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_owned()))
        }

        async fn remove(&self, _id: Uuid) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".to_owned()))
        }

        async fn exists(&self, _id: Uuid) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".to_owned()))
        }

        async fn query(
            &self,
            _predicate: &FeedPredicate,
            _sort: FeedSort,
            _skip: u64,
            _limit: u64,
        ) -> Result<ListingSummaryPage, StoreError> {
            Err(StoreError::Unavailable("down".to_owned()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_503() {
        let (tx, _rx) = listing_event_channel();
        let router = build_router(state_with(Arc::new(BrokenStore), tx, feed_updated_channel()));
        let (status, body) = get(&router, "/api/v1/feed/latest?page_size=5").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "storage_unavailable");
    }
}
