//! Request and response shapes exchanged with the browser.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProxyError;

/// A browser request to relay to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRequest {
    /// Provider base URL, e.g. `https://api.sandbox.checkout.com`.
    pub domain: String,
    /// Provider path, e.g. `/payments`.
    pub path: String,
    /// HTTP verb.
    pub verb: String,
    /// JSON body; ignored for `GET`.
    #[serde(default)]
    pub body: Option<Value>,
}

impl ProxyRequest {
    /// Creates a new proxy request.
    pub fn new(
        domain: impl Into<String>,
        path: impl Into<String>,
        verb: impl Into<String>,
        body: Option<Value>,
    ) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
            verb: verb.into(),
            body,
        }
    }

    /// The full target URL.
    pub fn url(&self) -> String {
        format!("{}{}", self.domain, self.path)
    }
}

/// Sentinel status values that are not HTTP codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMarker {
    /// The upstream call never produced a response.
    Exception,
}

/// Either the upstream HTTP status or a sentinel marker.
///
/// Serializes as a bare number or the marker string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxyStatus {
    /// Upstream status code, relayed unchanged.
    Code(u16),
    /// Local failure marker.
    Marker(StatusMarker),
}

/// What the browser receives back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyResponse {
    /// Upstream status, or `"exception"`.
    pub status: ProxyStatus,
    /// Upstream reason phrase. Absent on the exception sentinel.
    #[serde(rename = "statusText", default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    /// Upstream JSON body, `{}` when there was none, or the error detail.
    pub body: Value,
}

impl ProxyResponse {
    /// A relayed upstream response.
    pub fn relayed(status: u16, status_text: impl Into<String>, body: Value) -> Self {
        Self {
            status: ProxyStatus::Code(status),
            status_text: Some(status_text.into()),
            body,
        }
    }

    /// A relayed upstream response without a JSON body.
    pub fn relayed_empty(status: u16, status_text: impl Into<String>) -> Self {
        Self::relayed(status, status_text, Value::Object(Map::new()))
    }

    /// The exception sentinel carrying the failure detail.
    pub fn exception(error: &ProxyError) -> Self {
        Self {
            status: ProxyStatus::Marker(StatusMarker::Exception),
            status_text: None,
            body: serde_json::json!({ "error": error.to_string() }),
        }
    }

    /// Whether this is the exception sentinel.
    pub fn is_exception(&self) -> bool {
        matches!(self.status, ProxyStatus::Marker(StatusMarker::Exception))
    }

    /// The upstream status code, if there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self.status {
            ProxyStatus::Code(code) => Some(code),
            ProxyStatus::Marker(_) => None,
        }
    }
}

/// A provider JSON reply relayed with its status code.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayedJson {
    /// Upstream status code.
    pub status: u16,
    /// Upstream JSON body.
    pub body: Value,
}
