//! Request extractors for harness handlers.

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Request headers as captured into a stored notification.
///
/// Names are lower-case. Values that are not valid UTF-8 are skipped and
/// repeated headers are joined with `", "`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CapturedHeaders(headers): CapturedHeaders) -> String {
///     headers.get("cko-signature").cloned().unwrap_or_default()
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedHeaders(pub BTreeMap<String, String>);

impl CapturedHeaders {
    /// Captures headers from a header map.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let mut captured: BTreeMap<String, String> = BTreeMap::new();

        for (name, value) in headers {
            let Ok(value) = std::str::from_utf8(value.as_bytes()) else {
                continue;
            };
            captured
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        Self(captured)
    }
}

impl<S> FromRequestParts<S> for CapturedHeaders
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_header_map(&parts.headers))
    }
}
