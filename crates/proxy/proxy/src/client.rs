//! The API proxy: relays browser requests to the provider REST API.

use std::time::Duration;

use gateway_harness_core::{CredentialKind, CredentialPair, CredentialRoutes};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::error::{ProxyError, ProxyResult};
use crate::message::{ProxyRequest, ProxyResponse};

/// Default bound on a single upstream call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns true when a `content-type` value declares a JSON body.
///
/// This is the only signal used: a response without the header is relayed
/// with an empty body even when it has content.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Relays browser requests to the provider, authorizing each with the
/// credential the routing table selects for its path.
///
/// Upstream 4xx/5xx responses are relayed, not treated as failures.
pub struct ApiProxy {
    client: Client,
    credentials: CredentialPair,
    routes: CredentialRoutes,
}

impl ApiProxy {
    /// Creates a proxy with its own client bounded by `timeout`.
    pub fn new(
        credentials: CredentialPair,
        routes: CredentialRoutes,
        timeout: Duration,
    ) -> ProxyResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Client(e.to_string()))?;

        Ok(Self::with_client(client, credentials, routes))
    }

    /// Creates a proxy around an existing client.
    pub fn with_client(client: Client, credentials: CredentialPair, routes: CredentialRoutes) -> Self {
        Self {
            client,
            credentials,
            routes,
        }
    }

    /// The credential a path is authorized with.
    pub fn select_credential(&self, path: &str) -> CredentialKind {
        self.routes.select(path)
    }

    /// Builds the outbound request without sending it.
    pub fn build_request(&self, request: &ProxyRequest) -> ProxyResult<reqwest::Request> {
        let method = Method::from_bytes(request.verb.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| ProxyError::InvalidMethod(request.verb.clone()))?;

        let url = Url::parse(&request.url()).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;

        let kind = self.select_credential(&request.path);

        let mut builder = self
            .client
            .request(method.clone(), url)
            .header(AUTHORIZATION, self.credentials.key(kind))
            .header(CONTENT_TYPE, "application/json");

        if method != Method::GET && method != Method::HEAD {
            if let Some(body) = &request.body {
                builder = builder.body(serde_json::to_vec(body).map_err(|e| {
                    ProxyError::InvalidRequest(e.to_string())
                })?);
            }
        }

        Ok(builder.build()?)
    }

    /// Relays one request.
    ///
    /// Never fails: transport errors come back as the exception sentinel.
    pub async fn forward(&self, request: &ProxyRequest) -> ProxyResponse {
        match self.try_forward(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    method = %request.verb,
                    url = %request.url(),
                    error = %e,
                    "Upstream request failed"
                );
                ProxyResponse::exception(&e)
            }
        }
    }

    async fn try_forward(&self, request: &ProxyRequest) -> ProxyResult<ProxyResponse> {
        let outbound = self.build_request(request)?;

        tracing::debug!(
            method = %outbound.method(),
            url = %outbound.url(),
            credential = %self.select_credential(&request.path),
            "Forwarding request to provider"
        );

        let response = self.client.execute(outbound).await?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        tracing::info!(
            method = %request.verb,
            path = %request.path,
            status = status.as_u16(),
            "Provider responded"
        );

        if is_json_content_type(content_type) {
            let body: Value = response.json().await?;
            Ok(ProxyResponse::relayed(status.as_u16(), status_text, body))
        } else {
            Ok(ProxyResponse::relayed_empty(status.as_u16(), status_text))
        }
    }
}
