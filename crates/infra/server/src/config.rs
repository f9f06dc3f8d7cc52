//! Server configuration.
//!
//! Loaded from a TOML file when `HARNESS_CONFIG` names one, otherwise from
//! environment variables (a `.env` file is honoured).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gateway_harness_core::{CredentialPair, CredentialRoutes, CredentialTable, HarnessError};
use gateway_harness_proxy::ApplePaySettings;
use serde::{Deserialize, Serialize};

/// Environment variable naming a TOML configuration file.
pub const CONFIG_PATH_VAR: &str = "HARNESS_CONFIG";

const DEFAULT_API_BASE: &str = "https://api.sandbox.checkout.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub server: ServerConfig,
    /// Provider credentials keyed by tenant id.
    pub tenants: BTreeMap<String, TenantConfig>,
    pub proxy: ProxyConfig,
    pub store: StoreConfig,
    pub apple_pay: ApplePayConfig,
}

/// Server-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// One tenant's provider credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantConfig {
    pub secret_key: String,
    pub public_key: String,
    /// Key for webhook signatures. Defaults to the secret key.
    pub webhook_secret: Option<String>,
    pub processing_channel_id: Option<String>,
}

impl fmt::Debug for TenantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConfig")
            .field("secret_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("processing_channel_id", &self.processing_channel_id)
            .finish()
    }
}

/// API proxy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Tenant whose keys authorize proxied calls. Defaults to the first
    /// tenant by id.
    pub tenant: Option<String>,
    /// Upstream call timeout in seconds.
    pub timeout_secs: u64,
    /// Provider API base URL.
    pub api_base: String,
    /// Path-keyed credential selection.
    pub routes: CredentialRoutes,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            tenant: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_base: DEFAULT_API_BASE.to_string(),
            routes: CredentialRoutes::default(),
        }
    }
}

/// Event store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON-lines file notifications are appended to. In-memory when unset.
    pub event_log_path: Option<PathBuf>,
}

/// Apple Pay configuration. Disabled unless `merchant_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplePayConfig {
    /// Tenant whose keys pay for Apple Pay. Defaults to the proxy tenant.
    pub tenant: Option<String>,
    pub merchant_id: Option<String>,
    pub domain_name: String,
    pub display_name: String,
    /// PEM merchant identity certificate.
    pub certificate: Option<PathBuf>,
    /// PEM merchant identity key.
    pub key: Option<PathBuf>,
    pub amount: u64,
    pub currency: String,
}

impl Default for ApplePayConfig {
    fn default() -> Self {
        let settings = ApplePaySettings::default();
        Self {
            tenant: None,
            merchant_id: None,
            domain_name: settings.domain_name,
            display_name: settings.display_name,
            certificate: None,
            key: None,
            amount: settings.amount,
            currency: settings.currency,
        }
    }
}

impl ApplePayConfig {
    pub fn enabled(&self) -> bool {
        self.merchant_id.is_some()
    }
}

impl HarnessConfig {
    /// Loads configuration from `HARNESS_CONFIG` or the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => load_config(path),
            Err(_) => Self::from_lookup(|key| std::env::var(key).ok()),
        }
    }

    /// Builds configuration from environment-style variables.
    ///
    /// Tenants come from `PROVIDER_TENANTS` (comma separated); each tenant
    /// `abc` reads `PROVIDER_ABC_SECRET_KEY`, `PROVIDER_ABC_PUBLIC_KEY` and
    /// optionally `PROVIDER_ABC_WEBHOOK_SECRET` and
    /// `PROVIDER_ABC_PROCESSING_CHANNEL_ID`.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parsed = |key: &str| -> ConfigResult<Option<u64>> {
            var(key)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .map_err(|e| ConfigError::Parse(format!("{key}: {e}")))
                })
                .transpose()
        };

        let mut config = HarnessConfig::default();

        if let Some(host) = var("HOST") {
            config.server.host = host;
        }
        if let Some(port) = parsed("PORT")? {
            config.server.port = u16::try_from(port)
                .map_err(|_| ConfigError::Parse(format!("PORT: {port} is out of range")))?;
        }
        if let Some(level) = var("LOG_LEVEL") {
            config.server.log_level = level;
        }

        let tenant_ids = var("PROVIDER_TENANTS")
            .ok_or_else(|| ConfigError::Missing("PROVIDER_TENANTS".to_string()))?;

        for tenant in tenant_ids.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let prefix = format!("PROVIDER_{}", tenant.to_ascii_uppercase());
            let required = |suffix: &str| {
                let key = format!("{prefix}_{suffix}");
                var(&key).ok_or(ConfigError::Missing(key))
            };

            config.tenants.insert(
                tenant.to_string(),
                TenantConfig {
                    secret_key: required("SECRET_KEY")?,
                    public_key: required("PUBLIC_KEY")?,
                    webhook_secret: var(&format!("{prefix}_WEBHOOK_SECRET")),
                    processing_channel_id: var(&format!("{prefix}_PROCESSING_CHANNEL_ID")),
                },
            );
        }

        config.proxy.tenant = var("PROXY_TENANT");
        if let Some(secs) = parsed("PROXY_TIMEOUT_SECS")? {
            config.proxy.timeout_secs = secs;
        }
        if let Some(base) = var("PROVIDER_API_BASE") {
            config.proxy.api_base = base.trim_end_matches('/').to_string();
        }

        config.store.event_log_path = var("EVENT_LOG_PATH").map(PathBuf::from);

        config.apple_pay.tenant = var("APPLE_PAY_TENANT");
        config.apple_pay.merchant_id = var("APPLE_PAY_MERCHANT_ID");
        if let Some(domain) = var("APPLE_PAY_DOMAIN") {
            config.apple_pay.domain_name = domain;
        }
        if let Some(name) = var("APPLE_PAY_DISPLAY_NAME") {
            config.apple_pay.display_name = name;
        }
        config.apple_pay.certificate = var("APPLE_PAY_CERTIFICATE").map(PathBuf::from);
        config.apple_pay.key = var("APPLE_PAY_KEY").map(PathBuf::from);

        Ok(config)
    }

    /// Checks the configuration can start a server.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tenants.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one tenant must be configured".to_string(),
            ));
        }

        self.credential_table()?;
        self.proxy_tenant()?;

        if self.proxy.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "proxy timeout must be greater than zero".to_string(),
            ));
        }

        if self.apple_pay.enabled() {
            self.apple_pay_tenant()?;
            if self.apple_pay.certificate.is_some() != self.apple_pay.key.is_some() {
                return Err(ConfigError::Invalid(
                    "Apple Pay certificate and key must be configured together".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Builds the tenant credential table.
    pub fn credential_table(&self) -> ConfigResult<CredentialTable> {
        self.tenants
            .iter()
            .map(|(id, tenant)| -> ConfigResult<CredentialPair> {
                let mut pair = CredentialPair::new(id, &tenant.secret_key, &tenant.public_key)?;
                if let Some(secret) = &tenant.webhook_secret {
                    pair = pair.with_webhook_secret(secret);
                }
                if let Some(channel) = &tenant.processing_channel_id {
                    pair = pair.with_processing_channel_id(channel);
                }
                Ok(pair)
            })
            .collect()
    }

    /// Tenant whose keys the API proxy uses.
    pub fn proxy_tenant(&self) -> ConfigResult<&str> {
        match &self.proxy.tenant {
            Some(tenant) => self.known_tenant(tenant),
            None => self
                .tenants
                .keys()
                .next()
                .map(String::as_str)
                .ok_or_else(|| ConfigError::Missing("tenants".to_string())),
        }
    }

    /// Tenant whose keys Apple Pay uses.
    pub fn apple_pay_tenant(&self) -> ConfigResult<&str> {
        match &self.apple_pay.tenant {
            Some(tenant) => self.known_tenant(tenant),
            None => self.proxy_tenant(),
        }
    }

    /// Upstream call timeout.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy.timeout_secs)
    }

    /// Settings handed to the Apple Pay gateway.
    pub fn apple_pay_settings(&self) -> ApplePaySettings {
        ApplePaySettings {
            merchant_id: self.apple_pay.merchant_id.clone(),
            domain_name: self.apple_pay.domain_name.clone(),
            display_name: self.apple_pay.display_name.clone(),
            api_base: self.proxy.api_base.clone(),
            amount: self.apple_pay.amount,
            currency: self.apple_pay.currency.clone(),
            ..ApplePaySettings::default()
        }
    }

    fn known_tenant<'a>(&'a self, tenant: &'a str) -> ConfigResult<&'a str> {
        if self.tenants.contains_key(tenant) {
            Ok(tenant)
        } else {
            Err(HarnessError::unknown_tenant(tenant).into())
        }
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<HarnessConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Missing configuration: {0}")]
    Missing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Credential(#[from] HarnessError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_harness_core::CredentialKind;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.proxy.timeout_secs, 30);
        assert_eq!(config.apple_pay.amount, 300);
        assert!(!config.apple_pay.enabled());
    }

    #[test]
    fn test_from_lookup() {
        let config = HarnessConfig::from_lookup(lookup(&[
            ("PORT", "9090"),
            ("PROVIDER_TENANTS", "abc, nas"),
            ("PROVIDER_ABC_SECRET_KEY", "sk_abc"),
            ("PROVIDER_ABC_PUBLIC_KEY", "pk_abc"),
            ("PROVIDER_NAS_SECRET_KEY", "sk_nas"),
            ("PROVIDER_NAS_PUBLIC_KEY", "pk_nas"),
            ("PROVIDER_NAS_WEBHOOK_SECRET", "whsec_nas"),
            ("PROVIDER_NAS_PROCESSING_CHANNEL_ID", "pc_nas"),
            ("PROXY_TENANT", "nas"),
            ("PROXY_TIMEOUT_SECS", "5"),
            ("PROVIDER_API_BASE", "https://api.checkout.com/"),
            ("EVENT_LOG_PATH", "/var/lib/harness/events.jsonl"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.tenants.len(), 2);
        assert_eq!(config.proxy_tenant().unwrap(), "nas");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(5));
        assert_eq!(config.proxy.api_base, "https://api.checkout.com");
        assert_eq!(
            config.store.event_log_path.as_deref(),
            Some(Path::new("/var/lib/harness/events.jsonl"))
        );

        let table = config.credential_table().unwrap();
        let nas = table.resolve("nas").unwrap();
        assert_eq!(nas.webhook_secret(), "whsec_nas");
        assert_eq!(nas.processing_channel_id(), Some("pc_nas"));
        assert_eq!(table.resolve("abc").unwrap().webhook_secret(), "sk_abc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_tenant_key() {
        let result = HarnessConfig::from_lookup(lookup(&[
            ("PROVIDER_TENANTS", "abc"),
            ("PROVIDER_ABC_SECRET_KEY", "sk_abc"),
        ]));

        match result {
            Err(ConfigError::Missing(key)) => assert_eq!(key, "PROVIDER_ABC_PUBLIC_KEY"),
            other => panic!("expected missing key, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_tenant_list() {
        let result = HarnessConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_invalid_port() {
        let result = HarnessConfig::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("PROVIDER_TENANTS", "abc"),
        ]));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_rejects_unknown_proxy_tenant() {
        let mut config = HarnessConfig::from_lookup(lookup(&[
            ("PROVIDER_TENANTS", "abc"),
            ("PROVIDER_ABC_SECRET_KEY", "sk_abc"),
            ("PROVIDER_ABC_PUBLIC_KEY", "pk_abc"),
        ]))
        .unwrap();
        config.proxy.tenant = Some("nas".to_string());

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Credential(HarnessError::UnknownTenant { .. }))
        ));
    }

    #[test]
    fn test_validation_rejects_empty_config() {
        assert!(matches!(
            HarnessConfig::default().validate(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validation_rejects_empty_key() {
        let mut config = HarnessConfig::default();
        config.tenants.insert(
            "abc".to_string(),
            TenantConfig {
                secret_key: String::new(),
                public_key: "pk_abc".to_string(),
                ..Default::default()
            },
        );

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Credential(HarnessError::MissingCredential { .. }))
        ));
    }

    #[test]
    fn test_apple_pay_identity_must_be_complete() {
        let mut config = HarnessConfig::from_lookup(lookup(&[
            ("PROVIDER_TENANTS", "abc"),
            ("PROVIDER_ABC_SECRET_KEY", "sk_abc"),
            ("PROVIDER_ABC_PUBLIC_KEY", "pk_abc"),
            ("APPLE_PAY_MERCHANT_ID", "merchant.com.example"),
            ("APPLE_PAY_CERTIFICATE", "/etc/harness/merchant.pem"),
        ]))
        .unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.apple_pay.key = Some(PathBuf::from("/etc/harness/merchant.key"));
        assert!(config.validate().is_ok());
        assert_eq!(config.apple_pay_tenant().unwrap(), "abc");
    }

    #[test]
    fn test_toml_config() {
        let config: HarnessConfig = toml::from_str(
            r#"
            [server]
            port = 3000

            [tenants.abc]
            secret_key = "sk_abc"
            public_key = "pk_abc"

            [proxy]
            timeout_secs = 10

            [proxy.routes]
            default = "secret"
            overrides = { "/tokens" = "public", "/instruments" = "public" }

            [apple_pay]
            merchant_id = "merchant.com.example"
            domain_name = "harness.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.proxy.routes.select("/instruments"), CredentialKind::Public);
        assert_eq!(config.proxy.api_base, DEFAULT_API_BASE);
        assert_eq!(config.apple_pay_settings().merchant_id.as_deref(), Some("merchant.com.example"));
        assert_eq!(config.apple_pay_settings().currency, "USD");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tenant_debug_is_redacted() {
        let tenant = TenantConfig {
            secret_key: "sk_live_very_secret".to_string(),
            public_key: "pk_abc".to_string(),
            ..Default::default()
        };
        assert!(!format!("{tenant:?}").contains("sk_live_very_secret"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(matches!(
            load_config("/nonexistent/harness.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
