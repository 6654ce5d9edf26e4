use serde::Serialize;

use crate::models::Serving;

#[derive(Debug, Clone, Serialize)]
pub struct FoodDetails {
    pub name: String,
    pub brand: Option<String>,
    pub servings: Vec<Serving>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodSearchItem {
    pub food_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSearchResponse {
    pub items: Vec<FoodSearchItem>,
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
}
