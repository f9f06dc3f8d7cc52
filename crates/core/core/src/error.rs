//! Error types for the harness core.
//!
//! Everything in this module describes a configuration problem: a tenant the
//! harness does not know, or a credential that was never supplied. Callers
//! fail closed on any of them.

use thiserror::Error;

/// The configuration error type shared by the harness crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// No credential pair is registered for the tenant.
    #[error("Unknown tenant: {tenant}")]
    UnknownTenant { tenant: String },

    /// A required credential is missing or empty.
    #[error("Missing credential '{key}' for tenant '{tenant}'")]
    MissingCredential { tenant: String, key: String },

    /// The configuration is otherwise invalid.
    #[error("Configuration error: {message}")]
    InvalidConfiguration { message: String },
}

impl HarnessError {
    /// Creates a new unknown tenant error.
    pub fn unknown_tenant(tenant: impl Into<String>) -> Self {
        Self::UnknownTenant {
            tenant: tenant.into(),
        }
    }

    /// Creates a new missing credential error.
    pub fn missing_credential(tenant: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingCredential {
            tenant: tenant.into(),
            key: key.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Returns an HTTP status code appropriate for this error.
    ///
    /// Unknown tenants are an authentication failure from the caller's point
    /// of view; everything else is a server-side misconfiguration.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownTenant { .. } => 401,
            Self::MissingCredential { .. } | Self::InvalidConfiguration { .. } => 500,
        }
    }
}

/// A Result type alias using HarnessError.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarnessError::unknown_tenant("xyz");
        assert_eq!(err.to_string(), "Unknown tenant: xyz");

        let err = HarnessError::missing_credential("abc", "secret_key");
        assert_eq!(
            err.to_string(),
            "Missing credential 'secret_key' for tenant 'abc'"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HarnessError::unknown_tenant("x").status_code(), 401);
        assert_eq!(HarnessError::missing_credential("x", "k").status_code(), 500);
        assert_eq!(HarnessError::config("bad").status_code(), 500);
    }
}
