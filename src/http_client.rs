//! Thin outbound HTTP adapter shared by every gateway.

use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Status, raw text and (when the text is JSON) the parsed body.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub text: String,
    pub json: Option<Value>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new() -> reqwest::Result<Self> {
        let inner = Client::builder()
            .user_agent(concat!("nutriproxy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner })
    }

    pub async fn get<Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
        bearer: Option<&str>,
    ) -> reqwest::Result<UpstreamResponse> {
        let mut req = self.inner.get(url).query(query);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        send(req, url).await
    }

    pub async fn post_form<F: Serialize + ?Sized>(
        &self,
        url: &str,
        form: &F,
        basic: Option<(&str, &str)>,
    ) -> reqwest::Result<UpstreamResponse> {
        let mut req = self.inner.post(url).form(form);
        if let Some((user, pass)) = basic {
            req = req.basic_auth(user, Some(pass));
        }
        send(req, url).await
    }

    pub async fn post_json<Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
        body: &Value,
    ) -> reqwest::Result<UpstreamResponse> {
        let req = self
            .inner
            .post(url)
            .query(query)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body);
        send(req, url).await
    }
}

async fn send(req: RequestBuilder, url: &str) -> reqwest::Result<UpstreamResponse> {
    let res = req.send().await?;
    let status = res.status();
    let text = res.text().await?;
    let json = serde_json::from_str(&text).ok();
    debug!(url = %url, %status, parsed = json.is_some(), "upstream response");
    Ok(UpstreamResponse { status, text, json })
}
