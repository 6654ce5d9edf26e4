use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{number, text};

/// Macros reported by the model. Label reads may legitimately miss fields, so
/// everything is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionEstimate {
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub per_amount: Option<f64>,
    pub per_unit: Option<String>,
}

impl NutritionEstimate {
    pub fn from_value(v: &Value) -> Self {
        Self {
            kcal: number(v.get("kcal")),
            protein_g: number(v.get("protein_g")),
            fat_g: number(v.get("fat_g")),
            carbs_g: number(v.get("carbs_g")),
            per_amount: number(v.get("per_amount")),
            per_unit: text(v.get("per_unit")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LabelRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
}
