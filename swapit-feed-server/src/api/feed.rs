//! Feed read API.
//!
//! # Endpoints
//!
//! - `GET  /latest`  – newest active listings
//! - `GET  /tag`     – listings carrying `tag`
//! - `GET  /price`   – listings within `min_price`..=`max_price`
//! - `GET  /search`  – any combination of the above
//! - `POST /refresh` – ask subscribers to re-read the feed
//! - `GET  /updates` – WebSocket stream of feed change notifications
//!
//! Every read accepts `page_size` (defaults to `feed.default_page_size`) and
//! `page` (1-indexed, defaults to 1).

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use swapit_feed_core::entities::ListingSummary;
use swapit_feed_core::query::{self, FeedView, ValidationError};
use swapit_feed_sdk::objects::{
    AppliedFiltersResponse, FeedQuery, FeedUpdatedPayload, FeedViewResponse,
    ListingSummaryResponse, Price, SortDirection, SortField, SortResponse, to_unix_millis,
};

use super::ApiError;
use super::extractors::FeedParams;
use super::feed_ws;
use crate::state::AppState;

/// Build the feed API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/latest", get(get_latest))
        .route("/tag", get(filter_by_tag))
        .route("/price", get(filter_by_price))
        .route("/search", get(search))
        .route("/refresh", post(refresh))
        .route("/updates", get(feed_ws::feed_updates_ws))
}

async fn page_size(state: &AppState, params: &FeedQuery) -> i64 {
    match params.page_size {
        Some(size) => size,
        None => state.config.feed.read().await.default_page_size,
    }
}

/// `GET /latest`
async fn get_latest(
    State(state): State<AppState>,
    FeedParams(params): FeedParams,
) -> Result<Json<FeedViewResponse>, ApiError> {
    let page_size = page_size(&state, &params).await;
    let view = state.feed.get_latest(page_size, params.page).await?;
    Ok(Json(to_response(view)))
}

/// `GET /tag?tag=...`
async fn filter_by_tag(
    State(state): State<AppState>,
    FeedParams(params): FeedParams,
) -> Result<Json<FeedViewResponse>, ApiError> {
    let page_size = page_size(&state, &params).await;
    let tag = params.tag.as_deref().ok_or(ValidationError::EmptyTag)?;
    let view = state.feed.filter_by_tag(tag, page_size, params.page).await?;
    Ok(Json(to_response(view)))
}

/// `GET /price?min_price=...&max_price=...`
async fn filter_by_price(
    State(state): State<AppState>,
    FeedParams(params): FeedParams,
) -> Result<Json<FeedViewResponse>, ApiError> {
    let page_size = page_size(&state, &params).await;
    let view = state
        .feed
        .filter_by_price(params.min_price, params.max_price, page_size, params.page)
        .await?;
    Ok(Json(to_response(view)))
}

/// `GET /search?tag=...&min_price=...&max_price=...`
async fn search(
    State(state): State<AppState>,
    FeedParams(params): FeedParams,
) -> Result<Json<FeedViewResponse>, ApiError> {
    let page_size = page_size(&state, &params).await;
    let view = state
        .feed
        .filter_by_combined(
            params.tag.as_deref(),
            params.min_price,
            params.max_price,
            page_size,
            params.page,
        )
        .await?;
    Ok(Json(to_response(view)))
}

/// `POST /refresh`
async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    let update = state.feed.refresh_feed();
    Json(FeedUpdatedPayload::from(&update))
}

fn to_summary_response(summary: ListingSummary) -> ListingSummaryResponse {
    ListingSummaryResponse {
        id: summary.id,
        title: summary.title,
        price: Price {
            amount: summary.price.amount,
            currency: summary.price.currency,
        },
        tags: summary.tags,
        created_at: to_unix_millis(summary.created_at),
        last_updated_at: to_unix_millis(summary.last_updated_at),
        seller_id: summary.seller_id,
    }
}

/// Convert a `FeedView` (core model) into a `FeedViewResponse` (API model).
pub fn to_response(view: FeedView) -> FeedViewResponse {
    FeedViewResponse {
        items: view.items.into_iter().map(to_summary_response).collect(),
        total_count: view.total_count,
        page: view.page,
        page_size: view.page_size,
        total_pages: view.total_pages,
        filters: AppliedFiltersResponse {
            tag: view.filters.tag,
            min_price: view.filters.min_price,
            max_price: view.filters.max_price,
        },
        sort: SortResponse {
            field: match view.sort.field {
                query::SortField::CreatedAt => SortField::CreatedAt,
            },
            direction: match view.sort.direction {
                query::SortDirection::Ascending => SortDirection::Asc,
                query::SortDirection::Descending => SortDirection::Desc,
            },
        },
    }
}
