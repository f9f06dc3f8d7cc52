//! Webhook listener: verifies inbound notifications and persists the ones
//! that pass.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use gateway_harness_core::CredentialTable;
use gateway_harness_events::{Notification, NotificationId, NotificationStore};
use serde_json::Value;

use crate::error::WebhookResult;
use crate::signature::NotificationSigner;

/// Header the provider puts the body signature in.
pub const DEFAULT_SIGNATURE_HEADER: &str = "cko-signature";

/// Why a notification was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The tenant in the path has no credentials configured.
    UnknownTenant,
    /// The signature header was absent or empty.
    MissingSignature,
    /// The signature did not match the body.
    SignatureMismatch,
    /// The signature matched but the body is not JSON.
    MalformedPayload,
}

impl RejectionReason {
    /// Returns an HTTP status code appropriate for this rejection.
    ///
    /// Authentication failures all map to the same code so the response does
    /// not reveal which check failed.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownTenant | Self::MissingSignature | Self::SignatureMismatch => 401,
            Self::MalformedPayload => 400,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTenant => write!(f, "unknown tenant"),
            Self::MissingSignature => write!(f, "missing signature"),
            Self::SignatureMismatch => write!(f, "signature mismatch"),
            Self::MalformedPayload => write!(f, "malformed payload"),
        }
    }
}

/// Terminal state of one inbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerOutcome {
    /// Verified and stored.
    Accepted { id: NotificationId },
    /// Dropped without touching the store.
    Rejected(RejectionReason),
}

impl ListenerOutcome {
    /// Whether the notification was stored.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// An inbound notification as received on the wire.
#[derive(Debug, Clone)]
pub struct InboundNotification {
    /// Tenant selected by the request path.
    pub tenant: String,
    /// Full request path.
    pub path: String,
    /// Request headers, lower-case names.
    pub headers: BTreeMap<String, String>,
    /// Raw request body, exactly as received.
    pub body: Vec<u8>,
}

/// Verifies inbound notifications against the tenant's secret and stores
/// the ones that pass.
///
/// Every call performs at most one store write. There is no deduplication:
/// a replayed notification with a valid signature is stored again.
pub struct WebhookListener {
    credentials: Arc<CredentialTable>,
    store: Arc<dyn NotificationStore>,
}

impl WebhookListener {
    /// Creates a new listener.
    pub fn new(credentials: Arc<CredentialTable>, store: Arc<dyn NotificationStore>) -> Self {
        Self { credentials, store }
    }

    /// The store accepted notifications are written to.
    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }

    /// Processes one inbound notification.
    ///
    /// Returns `Err` only when a verified notification could not be stored.
    pub async fn receive(&self, inbound: InboundNotification) -> WebhookResult<ListenerOutcome> {
        let InboundNotification {
            tenant,
            path,
            headers,
            body,
        } = inbound;

        tracing::info!(tenant = %tenant, bytes = body.len(), "Received event notification");

        let credentials = match self.credentials.resolve(&tenant) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(tenant = %tenant, error = %e, "Rejecting notification");
                return Ok(ListenerOutcome::Rejected(RejectionReason::UnknownTenant));
            }
        };

        let signature = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(DEFAULT_SIGNATURE_HEADER))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty());

        let Some(signature) = signature else {
            tracing::warn!(tenant = %tenant, "Notification has no signature");
            return Ok(ListenerOutcome::Rejected(RejectionReason::MissingSignature));
        };

        let signer = NotificationSigner::new(credentials.webhook_secret());
        if !signer.verify(&body, signature) {
            tracing::warn!(tenant = %tenant, "Signature mismatch");
            return Ok(ListenerOutcome::Rejected(RejectionReason::SignatureMismatch));
        }

        tracing::debug!(tenant = %tenant, "Signature match");

        let body: Value = match serde_json::from_slice(&body) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(tenant = %tenant, error = %e, "Signed notification is not JSON");
                return Ok(ListenerOutcome::Rejected(RejectionReason::MalformedPayload));
            }
        };

        let notification = Notification::new(path, headers, body);
        let event_type = notification.event_type().unwrap_or("unknown").to_string();

        let id = self.store.append(&notification).await.map_err(|e| {
            tracing::error!(tenant = %tenant, error = %e, "Failed to store notification");
            e
        })?;

        tracing::info!(tenant = %tenant, id = %id, event_type = %event_type, "Stored notification");

        Ok(ListenerOutcome::Accepted { id })
    }
}
