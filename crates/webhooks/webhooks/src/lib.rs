//! # Gateway Harness Webhooks
//!
//! Inbound notification handling for the harness:
//! - HMAC-SHA256 signature generation and verification
//! - A listener that verifies notifications per tenant and persists the
//!   ones that pass
//!
//! ## Example
//!
//! ```rust,ignore
//! use gateway_harness_webhooks::{InboundNotification, ListenerOutcome, WebhookListener};
//!
//! let listener = WebhookListener::new(credentials, store);
//!
//! match listener.receive(inbound).await? {
//!     ListenerOutcome::Accepted { id } => println!("stored {id}"),
//!     ListenerOutcome::Rejected(reason) => println!("dropped: {reason}"),
//! }
//! ```

mod error;
mod listener;
pub mod signature;

pub use error::{WebhookError, WebhookResult};
pub use listener::{
    InboundNotification, ListenerOutcome, RejectionReason, WebhookListener,
    DEFAULT_SIGNATURE_HEADER,
};
pub use signature::{verify, NotificationSigner};
