//! Mapping of harness results onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_harness_events::StoreError;
use gateway_harness_proxy::{ProxyError, RelayedJson};
use gateway_harness_webhooks::WebhookError;

/// Error wrapper that implements `IntoResponse`.
///
/// Renders as `{"error": <message>, "code": <status>}`.
#[derive(Debug)]
pub struct HarnessErrorResponse {
    status: u16,
    message: String,
}

impl HarnessErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Apple Pay routes hit while Apple Pay is not configured.
    pub fn apple_pay_disabled() -> Self {
        Self::new(503, "Apple Pay is not configured")
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

impl IntoResponse for HarnessErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({
            "error": self.message,
            "code": self.status
        });

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for HarnessErrorResponse {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Event store failure");
        Self::new(500, err.to_string())
    }
}

impl From<ProxyError> for HarnessErrorResponse {
    fn from(err: ProxyError) -> Self {
        tracing::error!(error = %err, "Provider call failed");
        Self::new(err.status_code(), err.to_string())
    }
}

impl From<WebhookError> for HarnessErrorResponse {
    fn from(err: WebhookError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

/// Relays a provider reply with its own status code.
pub fn relay(relayed: RelayedJson) -> Response {
    let status = StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(relayed.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_error_status_is_kept() {
        let response = HarnessErrorResponse::from(ProxyError::Timeout);
        assert_eq!(response.status(), 504);
        assert_eq!(response.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_relay_keeps_upstream_status() {
        let response = relay(RelayedJson {
            status: 422,
            body: serde_json::json!({"error_type": "request_invalid"}),
        });
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
