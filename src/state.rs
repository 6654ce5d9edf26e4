use crate::cache::ResponseCache;
use crate::config::AppConfig;
use crate::fatsecret::token::TokenManager;
use crate::http_client::HttpClient;
use crate::openfood::dto::SearchResponse;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http: HttpClient,
    pub tokens: Arc<TokenManager>,
    pub search_cache: Arc<ResponseCache<SearchResponse>>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config)
    }

    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http = HttpClient::new()?;
        let tokens = Arc::new(TokenManager::new(http.clone(), &config.fatsecret));
        Ok(Self {
            config: Arc::new(config),
            http,
            tokens,
            search_cache: Arc::new(ResponseCache::new()),
        })
    }

    /// State wired to a single fake upstream (all providers share `base`).
    #[cfg(test)]
    pub fn fake(base: &str) -> Self {
        use crate::config::{FatSecretConfig, GeminiConfig, OpenFoodConfig};

        let config = AppConfig {
            fatsecret: FatSecretConfig {
                client_id: "test".into(),
                client_secret: "test".into(),
                token_url: format!("{base}/connect/token"),
                api_url: format!("{base}/rest/server.api"),
            },
            openfood: OpenFoodConfig {
                region: "world".into(),
                base_url: Some(base.into()),
                fallback_url: base.into(),
                strict_country: false,
            },
            gemini: GeminiConfig {
                api_key: Some("test".into()),
                base_url: base.into(),
                models: vec!["gemini-1.5-flash".into()],
                versions: vec!["v1beta".into()],
            },
            static_dir: "public".into(),
        };
        Self::from_config(config).expect("fake state")
    }
}
