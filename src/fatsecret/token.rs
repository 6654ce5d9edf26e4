use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::{config::FatSecretConfig, error::ApiError, http_client::HttpClient};

/// A cached token is reused only while `now < expires_at - SAFETY_MARGIN`.
const SAFETY_MARGIN: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + SAFETY_MARGIN < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Single-slot OAuth client-credentials cache.
///
/// Callers racing on an expired token may each run an exchange; the last one
/// to finish wins the slot.
pub struct TokenManager {
    http: HttpClient,
    client_id: String,
    client_secret: String,
    token_url: String,
    slot: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(http: HttpClient, cfg: &FatSecretConfig) -> Self {
        Self {
            http,
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            token_url: cfg.token_url.clone(),
            slot: Mutex::new(None),
        }
    }

    pub async fn get_token(&self) -> Result<String, ApiError> {
        let cached = self
            .slot
            .lock()
            .as_ref()
            .filter(|t| t.is_fresh())
            .map(|t| t.token.clone());
        if let Some(token) = cached {
            debug!("reusing cached access token");
            return Ok(token);
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *self.slot.lock() = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self) -> Result<AccessToken, ApiError> {
        let form = [("grant_type", "client_credentials"), ("scope", "basic")];
        let res = self
            .http
            .post_form(
                &self.token_url,
                &form,
                Some((self.client_id.as_str(), self.client_secret.as_str())),
            )
            .await
            .map_err(|e| {
                error!(error = %e, "token exchange transport failure");
                ApiError::Auth(e.to_string())
            })?;

        if !res.is_success() {
            error!(status = %res.status, body = %res.text, "token exchange rejected");
            return Err(ApiError::Auth(format!(
                "token endpoint returned {}: {}",
                res.status, res.text
            )));
        }

        let parsed: TokenResponse = res
            .json
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or_else(|| ApiError::Auth("token response missing access_token".into()))?;

        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(parsed.expires_in))
            .ok_or_else(|| {
                error!(expires_in = parsed.expires_in, "token lifetime out of range");
                ApiError::Auth(format!("expires_in out of range: {}", parsed.expires_in))
            })?;

        info!(expires_in = parsed.expires_in, "obtained access token");
        Ok(AccessToken {
            token: parsed.access_token,
            expires_at,
        })
    }
}
