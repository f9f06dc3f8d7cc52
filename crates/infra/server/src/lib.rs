//! # Gateway Harness Server
//!
//! Standalone test harness for a payment provider: receives signed webhook
//! notifications, lists them back, and proxies browser calls to the
//! provider API.

mod config;

pub use config::{
    load_config, ApplePayConfig, ConfigError, ConfigResult, HarnessConfig, ProxyConfig,
    ServerConfig, StoreConfig, TenantConfig, CONFIG_PATH_VAR,
};

use std::sync::Arc;

use axum::Router;
use gateway_harness_axum::{harness_routes, HarnessState};
use gateway_harness_core::HarnessError;
use gateway_harness_events::{
    JsonLinesStore, MemoryNotificationStore, NotificationStore, StoreError,
};
use gateway_harness_proxy::{load_identity, ApiProxy, ApplePayGateway, ProxyError};
use gateway_harness_webhooks::WebhookListener;
use tower_http::trace::TraceLayer;

/// Result type for server startup.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Credential(#[from] HarnessError),
    #[error("Event store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The harness server.
pub struct HarnessServer {
    /// Server configuration.
    pub config: HarnessConfig,
}

impl HarnessServer {
    /// Creates a new server.
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Builds the application router.
    pub async fn router(&self) -> ServerResult<Router> {
        self.config.validate()?;

        let credentials = Arc::new(self.config.credential_table()?);
        let store = self.open_store().await?;
        let listener = WebhookListener::new(credentials.clone(), store);

        let proxy_pair = credentials.resolve(self.config.proxy_tenant()?)?.clone();
        let proxy = ApiProxy::new(
            proxy_pair,
            self.config.proxy.routes.clone(),
            self.config.upstream_timeout(),
        )?;

        let mut state = HarnessState::new(listener, proxy);
        if self.config.apple_pay.enabled() {
            state = state.with_apple_pay(self.apple_pay_gateway(&credentials)?);
        }

        Ok(harness_routes(state).layer(TraceLayer::new_for_http()))
    }

    /// Binds the configured address and serves until the process exits.
    pub async fn run(&self) -> ServerResult<()> {
        let app = self.router().await?;
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!(
            addr = %addr,
            tenants = ?self.config.tenants.keys().collect::<Vec<_>>(),
            apple_pay = self.config.apple_pay.enabled(),
            "Gateway harness listening"
        );

        axum::serve(listener, app).await?;
        Ok(())
    }

    async fn open_store(&self) -> ServerResult<Arc<dyn NotificationStore>> {
        match &self.config.store.event_log_path {
            Some(path) => {
                let store = JsonLinesStore::open(path.clone()).await?;
                tracing::info!(path = %path.display(), "Using event log file");
                Ok(Arc::new(store))
            }
            None => {
                tracing::warn!("No event log path configured; notifications are kept in memory");
                Ok(Arc::new(MemoryNotificationStore::new()))
            }
        }
    }

    fn apple_pay_gateway(
        &self,
        credentials: &gateway_harness_core::CredentialTable,
    ) -> ServerResult<ApplePayGateway> {
        let pair = credentials
            .resolve(self.config.apple_pay_tenant()?)?
            .clone();
        let timeout = self.config.upstream_timeout();
        let gateway = ApplePayGateway::new(pair, self.config.apple_pay_settings(), timeout)?;

        match (&self.config.apple_pay.certificate, &self.config.apple_pay.key) {
            (Some(certificate), Some(key)) => {
                let identity = load_identity(certificate, key)?;
                Ok(gateway.with_identity(identity, timeout)?)
            }
            _ => {
                tracing::warn!("No Apple Pay merchant identity; session validation is disabled");
                Ok(gateway)
            }
        }
    }
}
