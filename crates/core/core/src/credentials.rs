//! Per-tenant provider credentials.
//!
//! Each tenant (an "account structure" on the provider side) owns exactly one
//! secret key and one public key. The table is built once at startup and is
//! read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{HarnessError, HarnessResult};

/// Which half of a credential pair authorizes a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// The secret key (server-side calls).
    Secret,
    /// The public key (tokenization calls).
    Public,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Secret => write!(f, "secret"),
            CredentialKind::Public => write!(f, "public"),
        }
    }
}

/// A tenant's secret/public key pair.
///
/// `Debug` never prints key material.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    structure_id: String,
    secret_key: String,
    public_key: String,
    webhook_secret: Option<String>,
    processing_channel_id: Option<String>,
}

impl CredentialPair {
    /// Creates a credential pair, rejecting empty keys.
    pub fn new(
        structure_id: impl Into<String>,
        secret_key: impl Into<String>,
        public_key: impl Into<String>,
    ) -> HarnessResult<Self> {
        let structure_id = structure_id.into();
        let secret_key = secret_key.into();
        let public_key = public_key.into();

        if structure_id.trim().is_empty() {
            return Err(HarnessError::config("tenant id must not be empty"));
        }
        if secret_key.is_empty() {
            return Err(HarnessError::missing_credential(&structure_id, "secret_key"));
        }
        if public_key.is_empty() {
            return Err(HarnessError::missing_credential(&structure_id, "public_key"));
        }

        Ok(Self {
            structure_id,
            secret_key,
            public_key,
            webhook_secret: None,
            processing_channel_id: None,
        })
    }

    /// Uses a dedicated key for webhook signatures instead of the secret key.
    ///
    /// An empty value is ignored.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.webhook_secret = (!secret.is_empty()).then_some(secret);
        self
    }

    /// Sets the processing channel used for payments made on this tenant.
    pub fn with_processing_channel_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.processing_channel_id = (!id.is_empty()).then_some(id);
        self
    }

    /// The tenant identifier.
    pub fn structure_id(&self) -> &str {
        &self.structure_id
    }

    /// Returns the raw key for the requested half of the pair.
    pub fn key(&self, kind: CredentialKind) -> &str {
        match kind {
            CredentialKind::Secret => &self.secret_key,
            CredentialKind::Public => &self.public_key,
        }
    }

    /// The secret key.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// The public key.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// The key inbound notifications are signed with.
    pub fn webhook_secret(&self) -> &str {
        self.webhook_secret.as_deref().unwrap_or(&self.secret_key)
    }

    /// The processing channel id, if configured.
    pub fn processing_channel_id(&self) -> Option<&str> {
        self.processing_channel_id.as_deref()
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("structure_id", &self.structure_id)
            .field("secret_key", &"<redacted>")
            .field("public_key", &"<redacted>")
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("processing_channel_id", &self.processing_channel_id)
            .finish()
    }
}

/// Credential pairs keyed by tenant id.
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    tenants: HashMap<String, CredentialPair>,
}

impl CredentialTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pair, keyed by its structure id. Replaces any previous entry.
    pub fn insert(&mut self, pair: CredentialPair) {
        self.tenants.insert(pair.structure_id.clone(), pair);
    }

    /// Builder-style insert.
    pub fn with(mut self, pair: CredentialPair) -> Self {
        self.insert(pair);
        self
    }

    /// Looks up a tenant.
    pub fn get(&self, tenant: &str) -> Option<&CredentialPair> {
        self.tenants.get(tenant)
    }

    /// Looks up a tenant, failing closed when it is unknown.
    pub fn resolve(&self, tenant: &str) -> HarnessResult<&CredentialPair> {
        self.get(tenant)
            .ok_or_else(|| HarnessError::unknown_tenant(tenant))
    }

    /// Returns all tenant ids, sorted.
    pub fn tenant_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tenants.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of tenants.
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

impl FromIterator<CredentialPair> for CredentialTable {
    fn from_iter<I: IntoIterator<Item = CredentialPair>>(iter: I) -> Self {
        let mut table = CredentialTable::new();
        for pair in iter {
            table.insert(pair);
        }
        table
    }
}
