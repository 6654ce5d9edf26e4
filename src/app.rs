use std::net::SocketAddr;

use axum::{
    extract::Request,
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;
use crate::{fatsecret, gemini, openfood};

pub fn build_app(state: AppState) -> Router {
    let static_files =
        ServeDir::new(&state.config.static_dir).not_found_service(not_found.into_service());

    Router::new()
        .merge(openfood::router())
        .merge(fatsecret::router())
        .merge(gemini::router())
        .route("/api/health", get(|| async { "ok" }))
        .fallback_service(static_files)
        .with_state(state)
        .layer(middleware::from_fn(cors))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// Permissive CORS on every response; any OPTIONS is answered with 204.
async fn cors(req: Request, next: Next) -> Response {
    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    let headers = res.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    res
}

async fn not_found() -> Html<&'static str> {
    Html("<!doctype html><html><body><h1>404 Not Found</h1></body></html>")
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let port = std::env::var("APP_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "8080".into());
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        port
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod app_tests {
    use super::*;
    use axum::body::Body;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn call(app: Router, req: axum::http::Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post(uri: &str, body: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn search_end_to_end_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi/search.pl"))
            .and(query_param("search_terms", "leche"))
            .and(query_param("page", "1"))
            .and(query_param("page_size", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 57,
                "products": [
                    { "code": "1", "product_name": "Leche entera",
                      "nutriments": { "energy-kcal_100g": 63.4, "proteins_100g": 3.1 } },
                    { "code": "2", "product_name": "Leche desnatada",
                      "nutriments": { "energy-kcal_100g": 34.5 } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = build_app(AppState::fake(&server.uri()));
        let (status, body) = call(app.clone(), get("/api/search?q=leche&page=1&page_size=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["pageSize"], 2);
        assert_eq!(body["items"][0]["kcal_100g"], 63);
        assert_eq!(body["items"][1]["kcal_100g"], 35);

        // same key, different case: served from cache
        let (status, again) = call(app, get("/api/search?q=LECHE&page=1&page_size=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again, body);
    }

    #[tokio::test]
    async fn missing_params_are_bad_requests() {
        let app = build_app(AppState::fake("http://127.0.0.1:9"));
        for uri in ["/api/search", "/api/search?q=%20", "/api/food", "/api/barcode"] {
            let (status, body) = call(app.clone(), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn barcode_miss_is_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/product/123.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 0 })))
            .mount(&server)
            .await;

        let app = build_app(AppState::fake(&server.uri()));
        let (status, body) = call(app, get("/api/barcode?barcode=123")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");
    }

    #[tokio::test]
    async fn food_details_through_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "t",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/server.api"))
            .and(query_param("food_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "food": { "food_name": "Huevo", "servings": { "serving": { "calories": "78" } } }
            })))
            .expect(2)
            .mount(&server)
            .await;

        let app = build_app(AppState::fake(&server.uri()));
        for _ in 0..2 {
            let (status, body) = call(app.clone(), get("/api/food?food_id=42")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["name"], "Huevo");
            assert_eq!(body["servings"][0]["calories"], 78.0);
        }
    }

    #[tokio::test]
    async fn upstream_failure_is_500_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let app = build_app(AppState::fake(&server.uri()));
        let (status, body) = call(app, get("/api/food?food_id=1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("invalid_client"));
    }

    #[tokio::test]
    async fn food_suggest_validation_and_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{
                    "text": "{\"kcal\": 89, \"protein_g\": 1.1, \"fat_g\": 0.3, \"carbs_g\": 22.8}"
                }] } }]
            })))
            .mount(&server)
            .await;

        let app = build_app(AppState::fake(&server.uri()));
        let (status, _) = call(app.clone(), post("/api/food-suggest", "garbage")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(app, post("/api/food-suggest", r#"{"query":"banana"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kcal"], 89.0);
        assert_eq!(body["per_amount"], 100.0);
        assert_eq!(body["per_unit"], "g");
    }

    #[tokio::test]
    async fn label_ocr_checks_image_then_key() {
        let mut state = AppState::fake("http://127.0.0.1:9");
        let mut cfg = (*state.config).clone();
        cfg.gemini.api_key = None;
        state.config = std::sync::Arc::new(cfg);
        let app = build_app(state);

        let (status, _) = call(app.clone(), post("/api/label-ocr", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(app.clone(), post("/api/label-ocr", r#"{"image":"AAAA"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Missing GEMINI_API_KEY");

        let (status, _) = call(app, post("/api/food-suggest", r#"{"query":"x"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn label_ocr_accepts_photo_sized_images() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{
                    "text": "{\"kcal\": 250, \"protein_g\": 8, \"fat_g\": 12, \"carbs_g\": 30, \"per_amount\": 100, \"per_unit\": \"g\"}"
                }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = build_app(AppState::fake(&server.uri()));
        let image = "A".repeat(3 * 1024 * 1024);
        let body = format!(r#"{{"image":"{image}","mimeType":"image/jpeg"}}"#);
        let (status, est) = call(app, post("/api/label-ocr", &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(est["kcal"], 250.0);
        assert_eq!(est["per_unit"], "g");
    }

    #[tokio::test]
    async fn options_is_204_with_cors_headers() {
        let app = build_app(AppState::fake("http://127.0.0.1:9"));
        let res = app
            .oneshot(
                axum::http::Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let h = res.headers();
        assert_eq!(h[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(h[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(h[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[tokio::test]
    async fn unknown_static_path_is_404_html_with_cors() {
        let app = build_app(AppState::fake("http://127.0.0.1:9"));
        let res = app.oneshot(get("/no/such/file.js")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let ct = res.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(ct.starts_with("text/html"));
    }
}
