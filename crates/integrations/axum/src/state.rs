//! Shared state for harness routes.

use std::sync::Arc;

use gateway_harness_events::NotificationStore;
use gateway_harness_proxy::{ApiProxy, ApplePayGateway};
use gateway_harness_webhooks::WebhookListener;

/// Components the harness routes are served from.
#[derive(Clone)]
pub struct HarnessState {
    listener: Arc<WebhookListener>,
    proxy: Arc<ApiProxy>,
    apple_pay: Option<Arc<ApplePayGateway>>,
}

impl HarnessState {
    /// Creates state without Apple Pay.
    pub fn new(listener: WebhookListener, proxy: ApiProxy) -> Self {
        Self {
            listener: Arc::new(listener),
            proxy: Arc::new(proxy),
            apple_pay: None,
        }
    }

    /// Enables the Apple Pay routes.
    pub fn with_apple_pay(mut self, gateway: ApplePayGateway) -> Self {
        self.apple_pay = Some(Arc::new(gateway));
        self
    }

    pub fn listener(&self) -> &WebhookListener {
        &self.listener
    }

    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        self.listener.store()
    }

    pub fn proxy(&self) -> &ApiProxy {
        &self.proxy
    }

    pub fn apple_pay(&self) -> Option<&ApplePayGateway> {
        self.apple_pay.as_deref()
    }
}
