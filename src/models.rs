use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;

/// One portion of a food with its macros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serving {
    pub serving_description: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
    pub metric_serving_amount: f64,
    pub metric_serving_unit: String,
}

/// Query string shared by the search endpoints. Everything is optional so a
/// malformed value falls back to its default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn page(&self) -> u32 {
        normalize_page(parse_int(self.page.as_deref()))
    }

    pub fn page_size(&self) -> u32 {
        normalize_page_size(parse_int(self.page_size.as_deref()))
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

pub fn normalize_page(page: Option<i64>) -> u32 {
    match page {
        Some(p) if p > 0 => u32::try_from(p).unwrap_or(u32::MAX),
        _ => 1,
    }
}

pub fn normalize_page_size(size: Option<i64>) -> u32 {
    match size {
        Some(s) if s > 0 => s.min(MAX_PAGE_SIZE as i64) as u32,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Reads a number that upstreams send either as JSON number or numeric string.
pub fn number(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Nearest integer; never negative zero.
pub fn round_i64(v: f64) -> i64 {
    v.round() as i64
}

/// Lists that arrive as a single object when there is only one element.
pub fn one_or_many(v: Option<&Value>) -> Vec<&Value> {
    match v {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    }
}

pub fn text(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
