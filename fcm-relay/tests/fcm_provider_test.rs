mod common;

use common::service_account_json;
use fcm_relay::models::OutboundMessage;
use fcm_relay::services::{FcmProvider, ProviderError, PushProvider, ServiceAccount};
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/v1/projects/relay-test/messages:send";

fn provider(server: &MockServer) -> FcmProvider {
    let token_uri = format!("{}/token", server.uri());
    let account = ServiceAccount::from_json(&service_account_json(&token_uri)).unwrap();
    FcmProvider::with_account(account, &server.uri())
}

fn message() -> OutboundMessage {
    let mut data = HashMap::new();
    data.insert("count".to_string(), "3".to_string());
    OutboundMessage::new("device-token", "Hello", "World", data)
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn send_posts_message_and_returns_name() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("authorization", "Bearer ya29.test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "projects/relay-test/messages/0:1234"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let message_id = provider(&server).send(&message()).await.unwrap();
    assert_eq!(message_id, "projects/relay-test/messages/0:1234");

    let requests = server.received_requests().await.unwrap();
    let send_request = requests
        .iter()
        .find(|r| r.url.path() == SEND_PATH)
        .expect("send request recorded");
    let body: Value = serde_json::from_slice(&send_request.body).unwrap();

    assert_eq!(body["message"]["token"], "device-token");
    assert_eq!(body["message"]["notification"]["title"], "Hello");
    assert_eq!(body["message"]["data"]["count"], "3");
    assert_eq!(body["message"]["android"]["priority"], "high");
    assert_eq!(
        body["message"]["android"]["notification"]["channel_id"],
        "high_importance_channel"
    );
    assert_eq!(body["message"]["apns"]["payload"]["aps"]["badge"], 1);
}

#[tokio::test]
async fn access_token_is_reused_across_sends() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "projects/relay-test/messages/1"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let provider = provider(&server);
    for _ in 0..3 {
        provider.send(&message()).await.unwrap();
    }
}

#[tokio::test]
async fn unregistered_token_maps_to_messaging_code() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND",
                "details": [{
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": "UNREGISTERED"
                }]
            }
        })))
        .mount(&server)
        .await;

    let err = provider(&server).send(&message()).await.unwrap_err();

    assert_eq!(err.code(), Some("messaging/registration-token-not-registered"));
    assert_eq!(err.to_string(), "Requested entity was not found.");
}

#[tokio::test]
async fn invalid_token_maps_to_messaging_code() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "The registration token is not a valid FCM registration token",
                "status": "INVALID_ARGUMENT",
                "details": [{
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": "INVALID_ARGUMENT"
                }]
            }
        })))
        .mount(&server)
        .await;

    let err = provider(&server).send(&message()).await.unwrap_err();

    assert_eq!(err.code(), Some("messaging/invalid-registration-token"));
}

#[tokio::test]
async fn rejected_credentials_surface_as_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server).send(&message()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Authentication(_)));
    assert_eq!(err.code(), Some("app/invalid-credential"));
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn unreachable_backend_is_a_connection_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let token_uri = format!("{}/token", server.uri());
    let account = ServiceAccount::from_json(&service_account_json(&token_uri)).unwrap();
    let provider = FcmProvider::with_account(account, "http://127.0.0.1:1");

    let err = provider.send(&message()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Connection(_)));
    assert_eq!(err.code(), Some("app/network-error"));
}
