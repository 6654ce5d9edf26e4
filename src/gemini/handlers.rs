use axum::{
    extract::{DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use super::client::GenerationGateway;
use super::dto::{LabelRequest, NutritionEstimate, SuggestRequest};
use super::services::{extract_from_label_image, split_image, suggest_nutrition};
use crate::{error::ApiError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/food-suggest", post(food_suggest))
        .route("/api/label-ocr", post(label_ocr))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB, base64 label photos
}

/// Unreadable bodies become the empty request; required fields are checked afterwards.
fn tolerant_json<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        if !body.is_empty() {
            warn!(error = %e, "ignoring unparseable request body");
        }
        T::default()
    })
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// POST /api/food-suggest { query }
#[instrument(skip(state, body))]
pub async fn food_suggest(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<NutritionEstimate>, ApiError> {
    let gw = GenerationGateway::new(&state.http, &state.config.gemini)?;
    let req: SuggestRequest = tolerant_json(&body);
    let query = non_blank(req.query.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Missing query".into()))?;

    let estimate = suggest_nutrition(&gw, query).await?;
    info!(query, kcal = ?estimate.kcal, "nutrition suggested");
    Ok(Json(estimate))
}

/// POST /api/label-ocr { image, mimeType }
#[instrument(skip(state, body))]
pub async fn label_ocr(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<NutritionEstimate>, ApiError> {
    let req: LabelRequest = tolerant_json(&body);
    let image = non_blank(req.image.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Missing image".into()))?;
    let gw = GenerationGateway::new(&state.http, &state.config.gemini)?;

    let (data, mime_type) = split_image(image, req.mime_type.as_deref());
    let estimate = extract_from_label_image(&gw, data, mime_type).await?;
    Ok(Json(estimate))
}

#[cfg(test)]
mod handlers_tests {
    use super::*;

    #[test]
    fn tolerant_json_defaults_on_garbage() {
        let req: SuggestRequest = tolerant_json(&Bytes::from_static(b"not json"));
        assert!(req.query.is_none());
        let req: LabelRequest = tolerant_json(&Bytes::new());
        assert!(req.image.is_none());
        let req: LabelRequest =
            tolerant_json(&Bytes::from_static(br#"{"image":"AAAA","mimeType":"image/png"}"#));
        assert_eq!(req.image.as_deref(), Some("AAAA"));
        assert_eq!(req.mime_type.as_deref(), Some("image/png"));
    }
}
