//! # Gateway Harness Proxy
//!
//! Outbound calls to the payment provider.
//!
//! ## Features
//!
//! - **API proxy**: relays `{domain, path, verb, body}` requests, choosing
//!   the secret or public key by path
//! - **Exception sentinel**: transport failures come back as
//!   `{"status": "exception"}` instead of an HTTP error
//! - **Apple Pay**: merchant session validation and wallet payments
//!
//! ## Example
//!
//! ```rust,ignore
//! use gateway_harness_core::{CredentialPair, CredentialRoutes};
//! use gateway_harness_proxy::{ApiProxy, ProxyRequest, DEFAULT_UPSTREAM_TIMEOUT};
//!
//! let credentials = CredentialPair::new("nas", "sk_sbox_...", "pk_sbox_...")?;
//! let proxy = ApiProxy::new(credentials, CredentialRoutes::default(), DEFAULT_UPSTREAM_TIMEOUT)?;
//!
//! let response = proxy
//!     .forward(&ProxyRequest::new("https://api.sandbox.checkout.com", "/tokens", "POST", None))
//!     .await;
//! ```

mod apple_pay;
mod client;
mod error;
mod message;

pub use apple_pay::{
    load_identity, ApplePayContact, ApplePayGateway, ApplePayPayment, ApplePayPaymentRequest,
    ApplePaySettings, ApplePayToken, ValidateSessionRequest,
};
pub use client::{is_json_content_type, ApiProxy, DEFAULT_UPSTREAM_TIMEOUT};
pub use error::{ProxyError, ProxyResult};
pub use message::{ProxyRequest, ProxyResponse, ProxyStatus, RelayedJson, StatusMarker};
