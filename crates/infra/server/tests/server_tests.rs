//! Server assembly from configuration.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use gateway_harness_server::{ConfigError, HarnessConfig, HarnessServer, ServerError, TenantConfig};
use gateway_harness_webhooks::NotificationSigner;
use serde_json::Value;
use tower::ServiceExt;

fn config_with_log(path: std::path::PathBuf) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.tenants.insert(
        "nas".to_string(),
        TenantConfig {
            secret_key: "sk_test_nas".to_string(),
            public_key: "pk_test_nas".to_string(),
            webhook_secret: Some("whsec_nas".to_string()),
            processing_channel_id: None,
        },
    );
    config.store.event_log_path = Some(path);
    config
}

#[tokio::test]
async fn accepted_notifications_land_in_the_event_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("data").join("events.jsonl");
    let app = HarnessServer::new(config_with_log(log.clone()))
        .router()
        .await
        .unwrap();

    let body = r#"{"id":"evt_1","type":"payment_captured"}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/event-listener/nas")
        .header("content-type", "application/json")
        .header("cko-signature", NotificationSigner::new("whsec_nas").sign(body.as_bytes()))
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert_eq!(contents.lines().count(), 1);

    let listing = app
        .oneshot(
            Request::builder()
                .uri("/webhook-notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = to_bytes(listing.into_body(), usize::MAX).await.unwrap();
    let listed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listed[0]["notification"]["body"]["type"], "payment_captured");
}

#[tokio::test]
async fn secret_key_no_longer_verifies_when_webhook_secret_is_set() {
    let dir = tempfile::tempdir().unwrap();
    let app = HarnessServer::new(config_with_log(dir.path().join("events.jsonl")))
        .router()
        .await
        .unwrap();

    let body = r#"{"id":"evt_1"}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/event-listener/nas")
        .header("cko-signature", NotificationSigner::new("sk_test_nas").sign(body.as_bytes()))
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_configuration_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_log(dir.path().join("events.jsonl"));
    config.proxy.tenant = Some("abc".to_string());

    let result = HarnessServer::new(config).router().await;

    assert!(matches!(
        result,
        Err(ServerError::Config(ConfigError::Credential(_)))
    ));
}
