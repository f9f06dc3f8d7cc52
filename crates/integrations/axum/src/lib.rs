//! # Gateway Harness Axum Integration
//!
//! This crate serves the harness over HTTP:
//! - Webhook ingestion at `/event-listener/{tenant}`
//! - Stored notification listing
//! - The provider API proxy
//! - Apple Pay merchant endpoints
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gateway_harness_axum::{harness_routes, HarnessState};
//!
//! let state = HarnessState::new(listener, proxy).with_apple_pay(gateway);
//! let app: axum::Router = harness_routes(state);
//! ```

mod extractor;
mod response;
mod routes;
mod state;

pub use extractor::CapturedHeaders;
pub use response::{relay, HarnessErrorResponse};
pub use routes::harness_routes;
pub use state::HarnessState;
