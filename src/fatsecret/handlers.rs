use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::client::NutritionGateway;
use super::dto::{FoodDetails, FoodSearchResponse};
use crate::{error::ApiError, models::SearchParams, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/food", get(get_food))
        .route("/api/food-search", get(search_foods))
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodParams {
    pub food_id: Option<String>,
}

/// GET /api/food?food_id=
#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Query(p): Query<FoodParams>,
) -> Result<Json<FoodDetails>, ApiError> {
    let food_id = p
        .food_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing food_id".into()))?;

    let details = NutritionGateway::from_state(&state)
        .lookup_details(food_id)
        .await?;
    info!(food_id, servings = details.servings.len(), "food details");
    Ok(Json(details))
}

/// GET /api/food-search?q=&page=&page_size=
#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    Query(p): Query<SearchParams>,
) -> Result<Json<FoodSearchResponse>, ApiError> {
    let q = p
        .query()
        .ok_or_else(|| ApiError::BadRequest("Missing q".into()))?;
    let res = NutritionGateway::from_state(&state)
        .search_foods(q, p.page(), p.page_size())
        .await?;
    Ok(Json(res))
}
