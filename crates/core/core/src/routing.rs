//! Path-keyed credential selection for outbound provider calls.
//!
//! The provider accepts the public key only on its tokenization endpoint;
//! every other endpoint wants the secret key. The rule set is plain data so
//! it can be overridden from configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::credentials::CredentialKind;

/// Lookup table mapping request paths to the credential that authorizes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialRoutes {
    /// Credential used when no override matches.
    pub default: CredentialKind,
    /// Exact-path overrides.
    pub overrides: HashMap<String, CredentialKind>,
}

impl Default for CredentialRoutes {
    fn default() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert("/tokens".to_string(), CredentialKind::Public);
        Self {
            default: CredentialKind::Secret,
            overrides,
        }
    }
}

impl CredentialRoutes {
    /// Creates a table with no overrides.
    pub fn new(default: CredentialKind) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Adds an exact-path override.
    pub fn route(mut self, path: impl Into<String>, kind: CredentialKind) -> Self {
        self.overrides.insert(path.into(), kind);
        self
    }

    /// Selects the credential for a request path.
    ///
    /// Matching is exact; `/tokens/` and `/tokens?x=1` fall through to the
    /// default.
    pub fn select(&self, path: &str) -> CredentialKind {
        self.overrides.get(path).copied().unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes() {
        let routes = CredentialRoutes::default();
        assert_eq!(routes.select("/tokens"), CredentialKind::Public);
        assert_eq!(routes.select("/payments"), CredentialKind::Secret);
        assert_eq!(routes.select("/payments/pay_123/captures"), CredentialKind::Secret);
        assert_eq!(routes.select("/tokens/"), CredentialKind::Secret);
        assert_eq!(routes.select(""), CredentialKind::Secret);
    }

    #[test]
    fn test_custom_routes() {
        let routes = CredentialRoutes::new(CredentialKind::Public)
            .route("/payments", CredentialKind::Secret);
        assert_eq!(routes.select("/payments"), CredentialKind::Secret);
        assert_eq!(routes.select("/anything"), CredentialKind::Public);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let routes: CredentialRoutes = toml::from_str(
            r#"
            default = "secret"

            [overrides]
            "/tokens" = "public"
            "/instruments" = "public"
            "#,
        )
        .unwrap();

        assert_eq!(routes.select("/instruments"), CredentialKind::Public);
        assert_eq!(routes.select("/customers"), CredentialKind::Secret);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let routes: CredentialRoutes = toml::from_str("").unwrap();
        assert_eq!(routes, CredentialRoutes::default());
    }
}
