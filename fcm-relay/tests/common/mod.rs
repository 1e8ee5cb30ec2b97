#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fcm_relay::services::{PushProvider, RelayMetrics};
use fcm_relay::startup::{build_router, AppState, Application};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const SERVICE_ACCOUNT: &str = include_str!("../fixtures/service_account.json");

/// Service-account JSON whose token exchange points at `token_uri`.
pub fn service_account_json(token_uri: &str) -> String {
    let mut doc: Value = serde_json::from_str(SERVICE_ACCOUNT).expect("fixture is valid JSON");
    doc["token_uri"] = Value::from(token_uri);
    doc.to_string()
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn(provider: Arc<dyn PushProvider>) -> Self {
        let app = Application::build_with_provider(0, provider)
            .await
            .expect("Failed to build test application");
        Self::serve(app).await
    }

    pub async fn serve(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}

pub fn router(provider: Arc<dyn PushProvider>) -> Router {
    router_with_metrics(provider, Arc::new(RelayMetrics::new().expect("metrics register")))
}

pub fn router_with_metrics(provider: Arc<dyn PushProvider>, metrics: Arc<RelayMetrics>) -> Router {
    build_router(AppState::new(provider, metrics))
}

/// Status and raw text body, for non-JSON routes such as `/metrics`.
pub async fn get_text(router: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).expect("every response is JSON");
    (status, body)
}

pub async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}
