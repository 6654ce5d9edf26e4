use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the gateways and turned into `{ "error": ... }` bodies at the router.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-credentials exchange failed.
    #[error("auth error: {0}")]
    Auth(String),

    /// A data provider answered non-2xx or with an unreadable body.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    NotFound(String),

    /// Every model/version pair failed, or the model gave no JSON.
    #[error("{message}")]
    Generation {
        message: String,
        raw: Option<String>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    MissingConfig(String),
}

impl ApiError {
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            raw: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Generation {
                message,
                raw: Some(raw),
            } => json!({ "error": message, "raw": raw }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
