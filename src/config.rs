use anyhow::Context;
use serde::Deserialize;

const DEFAULT_FATSECRET_TOKEN_URL: &str = "https://oauth.fatsecret.com/connect/token";
const DEFAULT_FATSECRET_API_URL: &str = "https://platform.fatsecret.com/rest/server.api";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODELS: &str = "gemini-1.5-flash,gemini-1.5-flash-latest";
const DEFAULT_GEMINI_VERSIONS: &str = "v1beta,v1";

#[derive(Debug, Clone, Deserialize)]
pub struct FatSecretConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenFoodConfig {
    pub region: String,
    pub base_url: Option<String>,
    pub fallback_url: String,
    pub strict_country: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub fatsecret: FatSecretConfig,
    pub openfood: OpenFoodConfig,
    pub gemini: GeminiConfig,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let fatsecret = FatSecretConfig {
            client_id: std::env::var("FATSECRET_CLIENT_ID").context("FATSECRET_CLIENT_ID")?,
            client_secret: std::env::var("FATSECRET_CLIENT_SECRET")
                .context("FATSECRET_CLIENT_SECRET")?,
            token_url: std::env::var("FATSECRET_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_FATSECRET_TOKEN_URL.into()),
            api_url: std::env::var("FATSECRET_API_URL")
                .unwrap_or_else(|_| DEFAULT_FATSECRET_API_URL.into()),
        };
        let openfood = OpenFoodConfig {
            region: std::env::var("OFF_REGION").unwrap_or_else(|_| "es".into()),
            base_url: non_empty(std::env::var("OFF_BASE_URL").ok()),
            fallback_url: std::env::var("OFF_FALLBACK_URL")
                .unwrap_or_else(|_| crate::openfood::region::WORLD_BASE_URL.into()),
            strict_country: std::env::var("OFF_STRICT_COUNTRY")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        };
        let gemini = GeminiConfig {
            api_key: non_empty(std::env::var("GEMINI_API_KEY").ok()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into()),
            models: split_list(
                &std::env::var("GEMINI_MODELS").unwrap_or_else(|_| DEFAULT_GEMINI_MODELS.into()),
            ),
            versions: split_list(
                &std::env::var("GEMINI_API_VERSIONS")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_VERSIONS.into()),
            ),
        };
        Ok(Self {
            fatsecret,
            openfood,
            gemini,
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".into()),
        })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_flag(v: &str) -> bool {
    matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Comma separated list, trimmed, empty entries dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(" gemini-1.5-flash , ,gemini-pro,"),
            vec!["gemini-1.5-flash".to_string(), "gemini-pro".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn parse_flag_accepts_common_truthy_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn non_empty_filters_blank() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" x ".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
