//! Route mounting for the harness endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gateway_harness_events::StoredNotification;
use gateway_harness_proxy::{ApplePayPaymentRequest, ProxyRequest, ProxyResponse, ValidateSessionRequest};
use gateway_harness_webhooks::{InboundNotification, ListenerOutcome};

use crate::extractor::CapturedHeaders;
use crate::response::{relay, HarnessErrorResponse};
use crate::state::HarnessState;

/// Creates an Axum router with all harness routes.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .merge(harness_routes(state))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn harness_routes<S>(state: HarnessState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        // Webhook ingestion
        .route("/event-listener/{tenant}", post(event_listener_handler))
        // Stored notifications
        .route("/webhook-notifications", get(list_notifications_handler))
        .route("/fetch-events", post(list_notifications_handler))
        // Provider API proxy
        .route("/fetch-api-request", post(fetch_api_request_handler))
        // Apple Pay
        .route("/apple-pay-merchant-id", get(merchant_id_handler))
        .route("/apple-pay-validate-session", post(validate_session_handler))
        .route("/apple-pay-payment", post(apple_pay_payment_handler))
        .with_state(state)
}

async fn event_listener_handler(
    State(state): State<HarnessState>,
    Path(tenant): Path<String>,
    uri: Uri,
    CapturedHeaders(headers): CapturedHeaders,
    body: Bytes,
) -> StatusCode {
    let inbound = InboundNotification {
        tenant,
        path: uri.path().to_string(),
        headers,
        body: body.to_vec(),
    };

    match state.listener().receive(inbound).await {
        Ok(ListenerOutcome::Accepted { .. }) => StatusCode::OK,
        Ok(ListenerOutcome::Rejected(reason)) => {
            StatusCode::from_u16(reason.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
        }
        Err(e) => StatusCode::from_u16(e.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn list_notifications_handler(
    State(state): State<HarnessState>,
) -> Result<Json<Vec<StoredNotification>>, HarnessErrorResponse> {
    let notifications = state.store().list_all().await?;
    tracing::debug!(count = notifications.len(), "Listing stored notifications");
    Ok(Json(notifications))
}

async fn fetch_api_request_handler(
    State(state): State<HarnessState>,
    Json(request): Json<ProxyRequest>,
) -> Json<ProxyResponse> {
    Json(state.proxy().forward(&request).await)
}

async fn merchant_id_handler(State(state): State<HarnessState>) -> Response {
    match state.apple_pay().and_then(|gateway| gateway.merchant_id()) {
        Some(merchant_id) => merchant_id.to_string().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn validate_session_handler(
    State(state): State<HarnessState>,
    Json(request): Json<ValidateSessionRequest>,
) -> Result<Response, HarnessErrorResponse> {
    let gateway = state
        .apple_pay()
        .ok_or_else(HarnessErrorResponse::apple_pay_disabled)?;

    let relayed = gateway.validate_session(&request.validation_url).await?;
    Ok(relay(relayed))
}

async fn apple_pay_payment_handler(
    State(state): State<HarnessState>,
    Json(request): Json<ApplePayPaymentRequest>,
) -> Result<Response, HarnessErrorResponse> {
    let gateway = state
        .apple_pay()
        .ok_or_else(HarnessErrorResponse::apple_pay_disabled)?;

    let relayed = gateway.pay(&request.payment).await?;
    Ok(relay(relayed))
}
