//! Product JSON to normalized records.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::dto::{BarcodeProduct, Per100, SearchResponse, SearchResultItem};
use crate::models::{number, round_i64, text, Serving};

const IMAGE_KEYS: [&str; 3] = ["image_front_small_url", "image_front_url", "image_url"];

fn code_of(p: &Value) -> String {
    match p.get("code") {
        Some(Value::Number(n)) => n.to_string(),
        other => text(other).unwrap_or_default(),
    }
}

pub fn product_name(p: &Value, lang: &str) -> String {
    text(p.get("product_name"))
        .or_else(|| text(p.get(format!("product_name_{lang}").as_str())))
        .unwrap_or_else(|| format!("Producto {}", code_of(p)))
}

pub fn brand(p: &Value) -> Option<String> {
    text(p.get("brands")).or_else(|| text(p.get("brand_owner")))
}

pub fn image_url(p: &Value) -> Option<String> {
    IMAGE_KEYS.iter().find_map(|k| text(p.get(*k)))
}

/// Prefers the `_100g` key and falls back to the bare key, which is assumed
/// to already be per 100 g.
fn nutriment(n: Option<&Value>, key: &str) -> f64 {
    let Some(n) = n else { return 0.0 };
    if let Some(v) = number(n.get(format!("{key}_100g").as_str())) {
        return v;
    }
    match number(n.get(key)) {
        Some(v) => {
            debug!(key, value = v, "using base nutriment without _100g normalization");
            v
        }
        None => 0.0,
    }
}

pub fn per_100g(p: &Value) -> Per100 {
    let n = p.get("nutriments");
    Per100 {
        kcal: nutriment(n, "energy-kcal"),
        protein: nutriment(n, "proteins"),
        fat: nutriment(n, "fat"),
        carbs: nutriment(n, "carbohydrates"),
    }
}

pub fn map_item(p: &Value, lang: &str) -> SearchResultItem {
    let m = per_100g(p);
    SearchResultItem {
        id: code_of(p),
        name: product_name(p, lang),
        brand: brand(p),
        image_url: image_url(p),
        kcal_100g: round_i64(m.kcal),
        protein_100g: round_i64(m.protein),
        fat_100g: round_i64(m.fat),
        carbs_100g: round_i64(m.carbs),
    }
}

pub fn map_search(body: &Value, page: u32, page_size: u32, lang: &str) -> SearchResponse {
    let items: Vec<SearchResultItem> = body
        .get("products")
        .and_then(Value::as_array)
        .map(|ps| ps.iter().map(|p| map_item(p, lang)).collect())
        .unwrap_or_default();
    let count = number(body.get("count"))
        .map(|c| c as u64)
        .unwrap_or(items.len() as u64);
    SearchResponse {
        items,
        count,
        page,
        page_size,
    }
}

/// Leading integer of a serving size such as `"250g"` or `"30 g (2 biscuits)"`.
/// Missing, unparseable or zero means 100.
pub fn serving_grams(serving_size: &str) -> u32 {
    lazy_static! {
        static ref LEADING_INT: Regex = Regex::new(r"^\s*(\d+)").unwrap();
    }
    LEADING_INT
        .captures(serving_size)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|g| *g > 0)
        .unwrap_or(100)
}

fn scaled_serving(description: String, m: &Per100, grams: f64) -> Serving {
    let ratio = grams / 100.0;
    Serving {
        serving_description: description,
        calories: round_i64(m.kcal * ratio) as f64,
        protein: round_i64(m.protein * ratio) as f64,
        fat: round_i64(m.fat * ratio) as f64,
        carbohydrate: round_i64(m.carbs * ratio) as f64,
        metric_serving_amount: grams,
        metric_serving_unit: "g".into(),
    }
}

pub fn map_barcode(barcode: &str, p: &Value, lang: &str) -> BarcodeProduct {
    let m = per_100g(p);
    let mut servings = vec![scaled_serving("100 g".into(), &m, 100.0)];
    if let Some(size) = text(p.get("serving_size")) {
        let grams = serving_grams(&size);
        servings.push(scaled_serving(size, &m, grams as f64));
    }

    let food_id = match code_of(p) {
        c if c.is_empty() => barcode.to_string(),
        c => c,
    };
    BarcodeProduct {
        food_id,
        name: product_name(p, lang),
        brand: brand(p),
        image_url: image_url(p),
        servings,
    }
}
