//! Webhook error types.

use gateway_harness_events::StoreError;
use thiserror::Error;

/// Result type for webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Error type for webhook ingestion.
///
/// Verification failures are not errors; they are reported as a rejected
/// outcome. Only faults the sender cannot fix end up here.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The verified notification could not be persisted.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl WebhookError {
    /// Returns an HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        500
    }
}
