//! Pulls a JSON object out of free-form model output.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref FENCE: Regex =
        Regex::new(r"(?s)^\s*(?:```|`)\s*(?:json|JSON)?\s*(.*?)\s*(?:```|`)\s*$").unwrap();
    static ref BRACES: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Strips a surrounding code fence (triple backtick, or a single backtick
/// `json` variant) and keeps the inner text.
pub fn strip_fence(raw: &str) -> &str {
    match FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

/// Direct parse first, then the widest `{...}` span. `None` when neither parses.
pub fn extract_json(raw: &str) -> Option<Value> {
    let cleaned = strip_fence(raw);
    if let Ok(v) = serde_json::from_str::<Value>(cleaned) {
        return Some(v);
    }
    let span = BRACES.find(cleaned)?;
    serde_json::from_str(span.as_str()).ok()
}

#[cfg(test)]
mod extract_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_json_parses() {
        assert_eq!(extract_json(r#"{"kcal": 52}"#), Some(json!({ "kcal": 52 })));
    }

    #[test]
    fn fenced_json_matches_unwrapped() {
        let expected = json!({ "kcal": 52, "protein_g": 0.3 });
        let tagged = "```json\n{\"kcal\": 52, \"protein_g\": 0.3}\n```";
        let bare = "```\n{\"kcal\": 52, \"protein_g\": 0.3}\n```";
        let single = "`json {\"kcal\": 52, \"protein_g\": 0.3}`";
        assert_eq!(extract_json(tagged), Some(expected.clone()));
        assert_eq!(extract_json(bare), Some(expected.clone()));
        assert_eq!(extract_json(single), Some(expected));
    }

    #[test]
    fn prose_then_object_is_extracted() {
        let raw = "Sure! Here are the values per 100 g:\n{\"kcal\": 89, \"carbs_g\": 22.8}";
        assert_eq!(
            extract_json(raw),
            Some(json!({ "kcal": 89, "carbs_g": 22.8 }))
        );
    }

    #[test]
    fn nested_object_keeps_outer_braces() {
        let raw = "result: {\"a\": {\"b\": 1}} done";
        assert_eq!(extract_json(raw), Some(json!({ "a": { "b": 1 } })));
    }

    #[test]
    fn nothing_extractable_is_none() {
        assert_eq!(extract_json("I cannot help with that."), None);
        assert_eq!(extract_json("{ not json }"), None);
        assert_eq!(extract_json(""), None);
    }
}
