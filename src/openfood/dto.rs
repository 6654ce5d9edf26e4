use serde::{Deserialize, Serialize};

use crate::models::Serving;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub kcal_100g: i64,
    pub protein_100g: i64,
    pub fat_100g: i64,
    pub carbs_100g: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<SearchResultItem>,
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarcodeProduct {
    pub food_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub servings: Vec<Serving>,
}

/// Unrounded per-100 g macros read from a product.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Per100 {
    pub kcal: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}
