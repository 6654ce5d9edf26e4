use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    config::GeminiConfig, error::ApiError, fallback::first_success, http_client::HttpClient,
};

/// One (model, API version) combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    pub model: String,
    pub version: String,
}

/// Models in the outer loop, versions in the inner one.
pub fn candidate_pairs(models: &[String], versions: &[String]) -> Vec<CandidatePair> {
    models
        .iter()
        .flat_map(|m| {
            versions.iter().map(move |v| CandidatePair {
                model: m.clone(),
                version: v.clone(),
            })
        })
        .collect()
}

/// First text part of the first candidate, or empty when the shape is unexpected.
pub fn first_text(body: &Value) -> String {
    body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

pub struct GenerationGateway<'a> {
    http: &'a HttpClient,
    base_url: &'a str,
    api_key: &'a str,
    pairs: Vec<CandidatePair>,
}

impl<'a> GenerationGateway<'a> {
    pub fn new(http: &'a HttpClient, cfg: &'a GeminiConfig) -> Result<Self, ApiError> {
        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::MissingConfig("Missing GEMINI_API_KEY".into()))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/'),
            api_key,
            pairs: candidate_pairs(&cfg.models, &cfg.versions),
        })
    }

    /// Sends `payload` to each candidate pair in order and returns the text of
    /// the first 2xx answer. Fails with the last error body once all pairs fail.
    #[instrument(skip(self, payload), fields(pairs = self.pairs.len()))]
    pub async fn complete(&self, payload: &Value) -> Result<String, ApiError> {
        first_success(&self.pairs, |pair| {
            let pair = pair.clone();
            async move { self.generate(&pair, payload).await }
        })
        .await
    }

    async fn generate(&self, pair: &CandidatePair, payload: &Value) -> Result<String, ApiError> {
        let url = format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, pair.version, pair.model
        );
        let res = self
            .http
            .post_json(&url, &[("key", self.api_key)], payload)
            .await
            .map_err(|e| {
                warn!(model = %pair.model, version = %pair.version, error = %e, "generation transport failure");
                ApiError::generation(e.to_string())
            })?;

        if !res.is_success() {
            warn!(
                model = %pair.model,
                version = %pair.version,
                status = %res.status,
                body = %res.text,
                "generation attempt failed"
            );
            return Err(ApiError::generation(res.text));
        }

        info!(model = %pair.model, version = %pair.version, "generation succeeded");
        Ok(res.json.as_ref().map(first_text).unwrap_or_default())
    }
}
