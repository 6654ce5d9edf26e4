use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::client::ProductGateway;
use super::dto::{BarcodeProduct, SearchResponse};
use super::services::search_products;
use crate::{error::ApiError, models::SearchParams, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/barcode", get(barcode))
}

#[derive(Debug, Default, Deserialize)]
pub struct BarcodeParams {
    pub barcode: Option<String>,
}

/// GET /api/search?q=&page=&page_size=
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(p): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = p
        .query()
        .ok_or_else(|| ApiError::BadRequest("Missing q".into()))?;
    let res = search_products(&state, q, p.page(), p.page_size()).await?;
    Ok(Json(res))
}

/// GET /api/barcode?barcode=
#[instrument(skip(state))]
pub async fn barcode(
    State(state): State<AppState>,
    Query(p): Query<BarcodeParams>,
) -> Result<Json<BarcodeProduct>, ApiError> {
    let code = p
        .barcode
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing barcode".into()))?;

    let product = ProductGateway::new(&state.http, &state.config.openfood)
        .search_by_barcode(code)
        .await?;
    Ok(Json(product))
}
