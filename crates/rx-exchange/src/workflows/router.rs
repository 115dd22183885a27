use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::catalog::{search_catalog, CatalogProduct, CatalogReader, ProductCode};
use super::listing::{BoardEntry, BoardQuery, ListingId};
use super::seller::{SellerId, VerificationGate};
use super::MarketplacePorts;

/// Shared state behind the marketplace routes.
#[derive(Clone)]
pub struct MarketplaceState {
    catalog: Arc<dyn CatalogReader>,
    board: BoardQuery,
    gate: VerificationGate,
    search_limit: usize,
}

impl MarketplaceState {
    pub fn new(ports: &MarketplacePorts, board: BoardQuery, search_limit: usize) -> Self {
        Self {
            catalog: Arc::clone(&ports.catalog),
            board,
            gate: VerificationGate::new(Arc::clone(&ports.identity)),
            search_limit,
        }
    }
}

impl std::fmt::Debug for MarketplaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceState")
            .field("board", &self.board)
            .field("search_limit", &self.search_limit)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BoardParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    page: usize,
}

/// Board card as rendered by the listing grid.
#[derive(Debug, Clone, Serialize)]
pub struct BoardCardView {
    pub listing_id: ListingId,
    pub product_code: ProductCode,
    pub product_name: String,
    pub price: Option<String>,
    pub quantity: u32,
    pub expiry_date: String,
    pub is_expired: bool,
    pub opened_state: &'static str,
    pub condition: &'static str,
    pub thumbnail: String,
    pub image_urls: [String; 3],
    pub created_at: DateTime<Utc>,
}

impl From<BoardEntry> for BoardCardView {
    fn from(entry: BoardEntry) -> Self {
        Self {
            listing_id: entry.listing.id.clone(),
            product_code: entry.listing.product_code,
            product_name: entry.product_name().to_string(),
            price: entry.price_display(),
            quantity: entry.listing.quantity,
            expiry_date: entry.expiry_display(),
            is_expired: entry.is_expired,
            opened_state: entry.listing.opened_state.label(),
            condition: entry.condition_label(),
            thumbnail: entry.thumbnail().to_string(),
            created_at: entry.listing.created_at,
            image_urls: entry.listing.image_urls,
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<CatalogProduct>,
}

#[derive(Debug, Serialize)]
struct BoardResponse {
    query: String,
    page: usize,
    entries: Vec<BoardCardView>,
}

/// Read-only marketplace endpoints: catalog search, the board, and seller
/// verification state.
pub fn marketplace_router(state: MarketplaceState) -> Router {
    Router::new()
        .route("/api/v1/catalog/search", get(search_handler))
        .route("/api/v1/board", get(board_handler))
        .route(
            "/api/v1/sellers/:seller_id/verification",
            get(verification_handler),
        )
        .with_state(Arc::new(state))
}

pub(crate) async fn search_handler(
    State(state): State<Arc<MarketplaceState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    match search_catalog(state.catalog.as_ref(), &params.q, state.search_limit).await {
        Ok(results) => {
            let body = SearchResponse {
                query: params.q,
                results,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => {
            warn!(query = %params.q, error = %error, "catalog search request failed");
            upstream_failure(error.to_string())
        }
    }
}

pub(crate) async fn board_handler(
    State(state): State<Arc<MarketplaceState>>,
    Query(params): Query<BoardParams>,
) -> Response {
    match state.board.list_page(&params.q, params.page).await {
        Ok(entries) => {
            let body = BoardResponse {
                query: params.q,
                page: params.page,
                entries: entries.into_iter().map(BoardCardView::from).collect(),
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => {
            warn!(query = %params.q, error = %error, "board request failed");
            upstream_failure(error.to_string())
        }
    }
}

pub(crate) async fn verification_handler(
    State(state): State<Arc<MarketplaceState>>,
    Path(seller_id): Path<String>,
) -> Response {
    let seller_id = SellerId(seller_id);
    match state.gate.view(&seller_id).await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => upstream_failure(error.to_string()),
    }
}

fn upstream_failure(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
}
