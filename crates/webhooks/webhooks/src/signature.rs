//! HMAC signature generation and verification.
//!
//! The provider signs each notification with HMAC-SHA256 over the exact
//! request body bytes and sends the lower-case hex digest in a header. The
//! digest must be computed over the wire bytes: a body that has been parsed
//! and re-serialized will generally not hash to the same value.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signer for generating and verifying notification signatures.
pub struct NotificationSigner {
    secret: String,
}

impl NotificationSigner {
    /// Creates a new signer with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Generates the hex-encoded signature for the given payload.
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a supplied signature against the payload.
    ///
    /// An empty secret or an empty signature never verifies.
    pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
        if self.secret.is_empty() || signature.is_empty() {
            return false;
        }
        let expected = self.sign(payload);
        constant_time_compare(&expected, signature)
    }
}

/// Verifies `signature` as the HMAC-SHA256 hex digest of `payload` under `secret`.
pub fn verify(secret: &str, payload: &[u8], signature: &str) -> bool {
    NotificationSigner::new(secret).verify(payload, signature)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
