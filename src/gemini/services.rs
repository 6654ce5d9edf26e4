use serde_json::{json, Value};
use tracing::{instrument, warn};

use super::client::GenerationGateway;
use super::dto::NutritionEstimate;
use super::extract::extract_json;
use crate::error::ApiError;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

fn suggest_prompt(food: &str) -> String {
    format!(
        "Estimate the nutritional values of \"{food}\" per 100 g (or 100 ml for drinks). \
         Answer ONLY with a JSON object with exactly these keys: \
         kcal, protein_g, fat_g, carbs_g, per_amount, per_unit. \
         Use numbers for the values and \"g\" or \"ml\" for per_unit. No extra text."
    )
}

const LABEL_PROMPT: &str = "Read the nutrition facts label in this image. \
    Answer ONLY with a JSON object with exactly these keys: \
    kcal, protein_g, fat_g, carbs_g, per_amount, per_unit. \
    per_amount and per_unit describe the reference quantity the label uses (for example 100 and \"g\"). \
    Use null for anything you cannot read. No extra text.";

pub fn text_payload(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": { "temperature": 0.2 }
    })
}

pub fn image_payload(prompt: &str, data: &str, mime_type: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": prompt },
                { "inline_data": { "mime_type": mime_type, "data": data } }
            ]
        }],
        "generationConfig": { "temperature": 0.1 }
    })
}

/// Accepts raw base64 or a `data:<mime>;base64,<payload>` URL. Returns the
/// payload and the effective MIME type.
pub fn split_image<'a>(image: &'a str, mime_type: Option<&'a str>) -> (&'a str, &'a str) {
    let explicit = mime_type.map(str::trim).filter(|m| !m.is_empty());
    if let Some(rest) = image.strip_prefix("data:") {
        if let Some((meta, data)) = rest.split_once(',') {
            let from_url = meta.split(';').next().filter(|m| !m.is_empty());
            return (data, explicit.or(from_url).unwrap_or(DEFAULT_IMAGE_MIME));
        }
    }
    (image, explicit.unwrap_or(DEFAULT_IMAGE_MIME))
}

fn parse_estimate(raw: String) -> Result<NutritionEstimate, ApiError> {
    match extract_json(&raw) {
        Some(v) if v.is_object() => Ok(NutritionEstimate::from_value(&v)),
        _ => {
            warn!(raw = %raw, "model answer had no JSON");
            Err(ApiError::Generation {
                message: "No JSON from Gemini".into(),
                raw: Some(raw),
            })
        }
    }
}

#[instrument(skip(gw))]
pub async fn suggest_nutrition(
    gw: &GenerationGateway<'_>,
    food: &str,
) -> Result<NutritionEstimate, ApiError> {
    let raw = gw.complete(&text_payload(&suggest_prompt(food))).await?;
    let mut estimate = parse_estimate(raw)?;
    estimate.per_amount.get_or_insert(100.0);
    estimate.per_unit.get_or_insert_with(|| "g".into());
    Ok(estimate)
}

#[instrument(skip(gw, image))]
pub async fn extract_from_label_image(
    gw: &GenerationGateway<'_>,
    image: &str,
    mime_type: &str,
) -> Result<NutritionEstimate, ApiError> {
    let raw = gw
        .complete(&image_payload(LABEL_PROMPT, image, mime_type))
        .await?;
    parse_estimate(raw)
}
