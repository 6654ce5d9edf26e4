use serde_json::Value;
use tracing::{error, instrument};

use super::dto::{FoodDetails, FoodSearchItem, FoodSearchResponse};
use super::token::TokenManager;
use crate::{
    error::ApiError,
    http_client::HttpClient,
    models::{number, one_or_many, text, Serving},
    state::AppState,
};

/// Search and lookup against the OAuth-protected nutrition provider.
pub struct NutritionGateway<'a> {
    http: &'a HttpClient,
    tokens: &'a TokenManager,
    api_url: &'a str,
}

impl<'a> NutritionGateway<'a> {
    pub fn new(http: &'a HttpClient, tokens: &'a TokenManager, api_url: &'a str) -> Self {
        Self {
            http,
            tokens,
            api_url,
        }
    }

    pub fn from_state(st: &'a AppState) -> Self {
        Self::new(&st.http, &st.tokens, &st.config.fatsecret.api_url)
    }

    #[instrument(skip(self))]
    pub async fn lookup_details(&self, food_id: &str) -> Result<FoodDetails, ApiError> {
        let body = self
            .call(&[
                ("method", "food.get.v2"),
                ("food_id", food_id),
                ("format", "json"),
            ])
            .await?;
        let food = body
            .get("food")
            .ok_or_else(|| ApiError::Upstream("food.get: missing food".into()))?;
        Ok(map_details(food))
    }

    #[instrument(skip(self))]
    pub async fn search_foods(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<FoodSearchResponse, ApiError> {
        // upstream pages are zero based
        let page_number = page.saturating_sub(1).to_string();
        let max_results = page_size.to_string();
        let body = self
            .call(&[
                ("method", "foods.search"),
                ("search_expression", query),
                ("page_number", page_number.as_str()),
                ("max_results", max_results.as_str()),
                ("format", "json"),
            ])
            .await?;
        Ok(map_search(&body, page, page_size))
    }

    async fn call(&self, params: &[(&str, &str)]) -> Result<Value, ApiError> {
        let token = self.tokens.get_token().await?;
        let res = self
            .http
            .get(self.api_url, params, Some(token.as_str()))
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        if !res.is_success() {
            error!(status = %res.status, body = %res.text, "nutrition provider error");
            return Err(ApiError::Upstream(format!(
                "nutrition provider returned {}",
                res.status
            )));
        }
        let body = res
            .json
            .ok_or_else(|| ApiError::Upstream("nutrition provider returned non-JSON body".into()))?;
        // errors can arrive with a 200 status
        if let Some(err) = body.get("error") {
            let msg = text(err.get("message")).unwrap_or_else(|| err.to_string());
            return Err(ApiError::Upstream(msg));
        }
        Ok(body)
    }
}

fn map_details(food: &Value) -> FoodDetails {
    let servings = one_or_many(food.get("servings").and_then(|s| s.get("serving")))
        .into_iter()
        .map(map_serving)
        .collect();
    FoodDetails {
        name: text(food.get("food_name")).unwrap_or_default(),
        brand: text(food.get("brand_name")),
        servings,
    }
}

fn map_serving(s: &Value) -> Serving {
    let num = |k: &str| number(s.get(k)).unwrap_or(0.0);
    Serving {
        serving_description: text(s.get("serving_description")).unwrap_or_default(),
        calories: num("calories"),
        protein: num("protein"),
        fat: num("fat"),
        carbohydrate: num("carbohydrate"),
        metric_serving_amount: num("metric_serving_amount"),
        metric_serving_unit: text(s.get("metric_serving_unit")).unwrap_or_default(),
    }
}

fn map_search(body: &Value, page: u32, page_size: u32) -> FoodSearchResponse {
    let foods = body.get("foods");
    let items: Vec<FoodSearchItem> = one_or_many(foods.and_then(|f| f.get("food")))
        .into_iter()
        .map(|f| FoodSearchItem {
            food_id: match f.get("food_id") {
                Some(Value::Number(n)) => n.to_string(),
                other => text(other).unwrap_or_default(),
            },
            name: text(f.get("food_name")).unwrap_or_default(),
            brand: text(f.get("brand_name")),
            description: text(f.get("food_description")),
        })
        .collect();
    let count = number(foods.and_then(|f| f.get("total_results")))
        .map(|n| n as u64)
        .unwrap_or(items.len() as u64);
    FoodSearchResponse {
        items,
        count,
        page,
        page_size,
    }
}
