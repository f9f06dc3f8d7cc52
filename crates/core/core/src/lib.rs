//! # Gateway Harness Core
//!
//! Foundational types shared by the harness crates: per-tenant credential
//! pairs, the path-keyed rule table that picks between a tenant's secret and
//! public key, and the configuration error type.

pub mod credentials;
pub mod error;
pub mod routing;

pub use credentials::{CredentialKind, CredentialPair, CredentialTable};
pub use error::{HarnessError, HarnessResult};
pub use routing::CredentialRoutes;
