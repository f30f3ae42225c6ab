use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use super::domain::ListingId;
use super::query::SearchParams;
use super::repository::ListingRepository;
use super::service::{ListingError, ListingService};
use crate::web::error_response;

/// Router builder exposing the landing page and the listing catalog.
pub fn listings_router<L>(service: Arc<ListingService<L>>) -> Router
where
    L: ListingRepository + 'static,
{
    Router::new()
        .route("/", get(landing_handler::<L>))
        .route("/listings", get(index_handler::<L>))
        .route("/listings/search", get(search_handler::<L>))
        .route("/listings/:listing_id", get(detail_handler::<L>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageParams {
    #[serde(default)]
    page: Option<String>,
}

pub(crate) async fn landing_handler<L>(State(service): State<Arc<ListingService<L>>>) -> Response
where
    L: ListingRepository + 'static,
{
    match service.landing() {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn index_handler<L>(
    State(service): State<Arc<ListingService<L>>>,
    Query(params): Query<PageParams>,
) -> Response
where
    L: ListingRepository + 'static,
{
    match service.index(params.page.as_deref()) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn detail_handler<L>(
    State(service): State<Arc<ListingService<L>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingRepository + 'static,
{
    let Some(id) = ListingId::parse(&listing_id) else {
        return error_response(StatusCode::NOT_FOUND, format!("listing {listing_id} not found"));
    };

    match service.detail(id) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn search_handler<L>(
    State(service): State<Arc<ListingService<L>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    L: ListingRepository + 'static,
{
    match service.search(params) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(err) => failure(err),
    }
}

fn failure(err: ListingError) -> Response {
    let kind = err.kind();
    if !kind.is_user_facing() {
        error!(error = %err, "listing request failed");
    }
    error_response(kind.status_code(), err.to_string())
}
