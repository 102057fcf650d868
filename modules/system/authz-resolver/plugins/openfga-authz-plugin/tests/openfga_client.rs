#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use authz_resolver_sdk::{PolicyStoreClient, PolicyStoreError, TupleKey};
use httpmock::prelude::*;
use openfga_authz_plugin::{OpenFgaConfig, Service};
use secrecy::SecretString;
use serde_json::json;

const STORE: &str = "01HSTORE";

fn config(server: &MockServer) -> OpenFgaConfig {
    OpenFgaConfig {
        api_url: format!("{}/", server.base_url()),
        store_id: STORE.to_owned(),
        ..OpenFgaConfig::default()
    }
}

fn viewer_tuple() -> TupleKey {
    TupleKey::new("user:abc-123", "viewer", "menu_item:risk_dashboard")
}

#[tokio::test]
async fn check_posts_tuple_and_reads_allowed() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/stores/{STORE}/check"))
                .json_body(json!({
                    "tuple_key": {
                        "user": "user:abc-123",
                        "relation": "viewer",
                        "object": "menu_item:risk_dashboard"
                    }
                }));
            then.status(200).json_body(json!({"allowed": true}));
        })
        .await;

    let client = Service::new(&config(&server)).unwrap();
    assert!(client.check(&viewer_tuple()).await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn check_returns_false_when_denied() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/stores/{STORE}/check"));
            then.status(200).json_body(json!({"allowed": false, "resolution": ""}));
        })
        .await;

    let client = Service::new(&config(&server)).unwrap();
    assert!(!client.check(&viewer_tuple()).await.unwrap());
}

#[tokio::test]
async fn pinned_model_and_token_are_sent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/stores/{STORE}/check"))
                .header("authorization", "Bearer fga-secret")
                .json_body(json!({
                    "tuple_key": {
                        "user": "user:abc-123",
                        "relation": "viewer",
                        "object": "menu_item:risk_dashboard"
                    },
                    "authorization_model_id": "01HMODEL"
                }));
            then.status(200).json_body(json!({"allowed": true}));
        })
        .await;

    let cfg = OpenFgaConfig {
        authorization_model_id: Some("01HMODEL".to_owned()),
        api_token: Some(SecretString::from("fga-secret")),
        ..config(&server)
    };
    let client = Service::new(&cfg).unwrap();
    assert!(client.check(&viewer_tuple()).await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_maps_to_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/stores/{STORE}/check"));
            then.status(400).json_body(json!({
                "code": "validation_error",
                "message": "type 'menu_item' not found"
            }));
        })
        .await;

    let client = Service::new(&config(&server)).unwrap();
    let err = client.check(&viewer_tuple()).await.unwrap_err();
    match err {
        PolicyStoreError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("validation_error"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn undecodable_body_maps_to_invalid_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/stores/{STORE}/check"));
            then.status(200).body("<html>gateway</html>");
        })
        .await;

    let client = Service::new(&config(&server)).unwrap();
    let err = client.check(&viewer_tuple()).await.unwrap_err();
    assert!(matches!(err, PolicyStoreError::InvalidResponse(_)));
}

#[tokio::test]
async fn slow_store_maps_to_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/stores/{STORE}/check"));
            then.status(200)
                .json_body(json!({"allowed": true}))
                .delay(Duration::from_millis(500));
        })
        .await;

    let cfg = OpenFgaConfig {
        request_timeout_ms: 50,
        ..config(&server)
    };
    let client = Service::new(&cfg).unwrap();
    let err = client.check(&viewer_tuple()).await.unwrap_err();
    assert!(matches!(err, PolicyStoreError::Unavailable(_)));
}

#[tokio::test]
async fn unreachable_store_maps_to_unavailable() {
    let cfg = OpenFgaConfig {
        api_url: "http://127.0.0.1:1".to_owned(),
        store_id: STORE.to_owned(),
        connect_timeout_ms: 200,
        request_timeout_ms: 500,
        ..OpenFgaConfig::default()
    };
    let client = Service::new(&cfg).unwrap();
    let err = client.check(&viewer_tuple()).await.unwrap_err();
    assert!(matches!(err, PolicyStoreError::Unavailable(_)));
}

#[tokio::test]
async fn write_sends_tuple_keys() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/stores/{STORE}/write"))
                .json_body(json!({
                    "writes": {
                        "tuple_keys": [
                            {"user": "user:u2", "relation": "assignee", "object": "role:admin"}
                        ]
                    }
                }));
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = Service::new(&config(&server)).unwrap();
    client
        .write(&[TupleKey::new("user:u2", "assignee", "role:admin")])
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_write_skips_the_round_trip() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/stores/{STORE}/write"));
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = Service::new(&config(&server)).unwrap();
    client.write(&[]).await.unwrap();
    assert_eq!(mock.hits_async().await, 0);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let err = Service::new(&OpenFgaConfig::default()).unwrap_err();
    assert!(matches!(err, PolicyStoreError::Config(_)));
}
