//! Apple Pay flows: merchant session validation and wallet payments.
//!
//! Session validation is a mutually authenticated call to the URL Apple
//! hands the browser; payments exchange the wallet token for a provider
//! token and then submit a payment with it.

use std::path::Path;
use std::time::Duration;

use gateway_harness_core::{CredentialPair, HarnessError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Identity, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ProxyError, ProxyResult};
use crate::message::RelayedJson;

/// Merchant and payment settings for Apple Pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplePaySettings {
    /// Apple merchant identifier.
    pub merchant_id: Option<String>,
    /// Domain registered with Apple.
    pub domain_name: String,
    /// Name shown on the payment sheet.
    pub display_name: String,
    /// Provider API base URL.
    pub api_base: String,
    /// Amount charged, in minor units.
    pub amount: u64,
    /// ISO currency code.
    pub currency: String,
    /// Required host suffix for validation URLs. `None` disables the check.
    pub validation_host_suffix: Option<String>,
}

impl Default for ApplePaySettings {
    fn default() -> Self {
        Self {
            merchant_id: None,
            domain_name: String::new(),
            display_name: "Gateway Harness".to_string(),
            api_base: "https://api.sandbox.checkout.com".to_string(),
            amount: 300,
            currency: "USD".to_string(),
            validation_host_suffix: Some("apple.com".to_string()),
        }
    }
}

/// Body of `POST /apple-pay-validate-session`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSessionRequest {
    /// URL supplied by Apple's `onvalidatemerchant` event.
    #[serde(rename = "validationURL")]
    pub validation_url: String,
}

/// Body of `POST /apple-pay-payment`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplePayPaymentRequest {
    /// The `ApplePayPayment` object from the payment sheet.
    pub payment: ApplePayPayment,
}

/// The parts of Apple's `ApplePayPayment` the harness uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayPayment {
    /// Encrypted wallet token.
    pub token: ApplePayToken,
    /// Billing contact, if the sheet requested it.
    #[serde(default)]
    pub billing_contact: Option<ApplePayContact>,
}

/// Wallet token wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayToken {
    /// Opaque encrypted payment data, forwarded as-is.
    pub payment_data: Value,
}

/// Apple Pay contact fields used for the billing address.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplePayContact {
    pub address_lines: Vec<String>,
    pub locality: Option<String>,
    pub administrative_area: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
}

impl ApplePayContact {
    /// Maps the contact to the provider's billing address shape.
    pub fn billing_address(&self) -> Value {
        json!({
            "address_line1": self.address_lines.first(),
            "city": self.locality,
            "state": self.administrative_area,
            "zip": self.postal_code,
            "country": self.country_code,
        })
    }
}

/// Loads a merchant identity from PEM certificate and key files.
pub fn load_identity(certificate: &Path, key: &Path) -> ProxyResult<Identity> {
    let mut pem = std::fs::read(certificate).map_err(|e| {
        ProxyError::Configuration(HarnessError::config(format!(
            "cannot read merchant certificate {}: {e}",
            certificate.display()
        )))
    })?;
    let key = std::fs::read(key).map_err(|e| {
        ProxyError::Configuration(HarnessError::config(format!(
            "cannot read merchant key {}: {e}",
            key.display()
        )))
    })?;
    pem.push(b'\n');
    pem.extend_from_slice(&key);

    Identity::from_pem(&pem).map_err(|e| {
        ProxyError::Configuration(HarnessError::config(format!("invalid merchant identity: {e}")))
    })
}

/// Apple Pay gateway.
pub struct ApplePayGateway {
    client: Client,
    session_client: Option<Client>,
    credentials: CredentialPair,
    settings: ApplePaySettings,
}

impl ApplePayGateway {
    /// Creates a gateway. Session validation is unavailable until an
    /// identity is attached.
    pub fn new(
        credentials: CredentialPair,
        settings: ApplePaySettings,
        timeout: Duration,
    ) -> ProxyResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            session_client: None,
            credentials,
            settings,
        })
    }

    /// Attaches the merchant identity used for session validation.
    pub fn with_identity(mut self, identity: Identity, timeout: Duration) -> ProxyResult<Self> {
        let client = Client::builder()
            .identity(identity)
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Client(e.to_string()))?;
        self.session_client = Some(client);
        Ok(self)
    }

    /// Uses a specific client for session validation.
    pub fn with_session_client(mut self, client: Client) -> Self {
        self.session_client = Some(client);
        self
    }

    /// The configured merchant identifier.
    pub fn merchant_id(&self) -> Option<&str> {
        self.settings.merchant_id.as_deref()
    }

    /// Requests a merchant session from Apple.
    pub async fn validate_session(&self, validation_url: &str) -> ProxyResult<RelayedJson> {
        let client = self.session_client.as_ref().ok_or_else(|| {
            HarnessError::config("Apple Pay merchant identity is not configured")
        })?;
        let merchant_id = self
            .merchant_id()
            .ok_or_else(|| HarnessError::config("Apple Pay merchant id is not configured"))?;

        let url = Url::parse(validation_url).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;
        self.check_validation_host(&url)?;

        let payload = json!({
            "merchantIdentifier": merchant_id,
            "domainName": self.settings.domain_name,
            "displayName": self.settings.display_name,
        });

        tracing::info!(url = %url, "Validating Apple Pay merchant session");

        let response = client.post(url).json(&payload).send().await?;
        relay_json(response).await
    }

    /// Tokenizes the wallet payment and submits it to the provider.
    ///
    /// If tokenization fails, the provider's token response is relayed and
    /// no payment is attempted.
    pub async fn pay(&self, payment: &ApplePayPayment) -> ProxyResult<RelayedJson> {
        let token_response = self
            .client
            .post(format!("{}/tokens", self.settings.api_base))
            .header(AUTHORIZATION, self.credentials.public_key())
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({
                "type": "applepay",
                "token_data": payment.token.payment_data,
            }))
            .send()
            .await?;
        let token = relay_json(token_response).await?;

        let Some(provider_token) = token.body.get("token").and_then(Value::as_str) else {
            tracing::warn!(status = token.status, "Apple Pay tokenization failed");
            return Ok(token);
        };

        let reference = gateway_harness_reference::payment_reference();

        let mut source = json!({
            "type": "token",
            "token": provider_token,
        });
        if let Some(contact) = &payment.billing_contact {
            source["billing_address"] = contact.billing_address();
        }

        let mut body = json!({
            "source": source,
            "amount": self.settings.amount,
            "currency": self.settings.currency,
            "reference": reference,
        });
        if let Some(channel) = self.credentials.processing_channel_id() {
            body["processing_channel_id"] = json!(channel);
        }

        tracing::info!(reference = %reference, "Submitting Apple Pay payment");

        let payment_response = self
            .client
            .post(format!("{}/payments", self.settings.api_base))
            .header(AUTHORIZATION, self.credentials.secret_key())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        relay_json(payment_response).await
    }

    fn check_validation_host(&self, url: &Url) -> ProxyResult<()> {
        let Some(suffix) = &self.settings.validation_host_suffix else {
            return Ok(());
        };
        let host = url.host_str().unwrap_or_default();
        if host == suffix.as_str() || host.ends_with(&format!(".{suffix}")) {
            Ok(())
        } else {
            Err(ProxyError::InvalidUrl(format!(
                "validation host {host} is not under {suffix}"
            )))
        }
    }
}

async fn relay_json(response: reqwest::Response) -> ProxyResult<RelayedJson> {
    let status = response.status().as_u16();
    let body: Value = response.json().await?;
    Ok(RelayedJson { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(suffix: Option<&str>) -> ApplePayGateway {
        let credentials = CredentialPair::new("nas", "sk_nas", "pk_nas").unwrap();
        let settings = ApplePaySettings {
            merchant_id: Some("merchant.com.example".to_string()),
            validation_host_suffix: suffix.map(str::to_string),
            ..Default::default()
        };
        ApplePayGateway::new(credentials, settings, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_validation_host_check() {
        let gateway = gateway(Some("apple.com"));
        let ok = Url::parse("https://apple-pay-gateway.apple.com/paymentservices/startSession").unwrap();
        let bare = Url::parse("https://apple.com/x").unwrap();
        let lookalike = Url::parse("https://evilapple.com/x").unwrap();

        assert!(gateway.check_validation_host(&ok).is_ok());
        assert!(gateway.check_validation_host(&bare).is_ok());
        assert!(gateway.check_validation_host(&lookalike).is_err());
    }

    #[test]
    fn test_billing_address_mapping() {
        let contact: ApplePayContact = serde_json::from_value(json!({
            "addressLines": ["1 Infinite Loop", "Suite 2"],
            "locality": "Cupertino",
            "administrativeArea": "CA",
            "postalCode": "95014",
            "countryCode": "US"
        }))
        .unwrap();

        assert_eq!(
            contact.billing_address(),
            json!({
                "address_line1": "1 Infinite Loop",
                "city": "Cupertino",
                "state": "CA",
                "zip": "95014",
                "country": "US"
            })
        );
    }

    #[tokio::test]
    async fn test_validate_session_requires_identity() {
        let result = gateway(None)
            .validate_session("https://apple-pay-gateway.apple.com/paymentservices/startSession")
            .await;

        match result {
            Err(err @ ProxyError::Configuration(_)) => assert_eq!(err.status_code(), 503),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_identity_files() {
        let result = load_identity(Path::new("/nonexistent/cert.pem"), Path::new("/nonexistent/key.pem"));
        assert!(matches!(result, Err(ProxyError::Configuration(_))));
    }
}
