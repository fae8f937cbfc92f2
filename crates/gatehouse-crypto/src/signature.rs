//! HMAC-SHA256 signatures over dynamic QR payloads.
//!
//! Signatures are URL-safe base64 without padding. An empty secret never
//! produces a verifiable signature.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Sign `payload` with `secret`.
///
/// Returns an empty string when the secret is empty, which [`verify`] rejects.
#[must_use]
pub fn sign(payload: &str, secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Verify `signature` over `payload` in constant time.
///
/// Fails closed: an empty secret, an empty signature, or a signature that is
/// not valid base64 all verify as `false`.
#[must_use]
pub fn verify(payload: &str, secret: &str, signature: &str) -> bool {
    if secret.is_empty() || signature.is_empty() {
        return false;
    }
    let Ok(provided) = URL_SAFE_NO_PAD.decode(signature.as_bytes()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload.as_bytes());
    let expected = mac.finalize().into_bytes();
    expected.as_slice().ct_eq(&provided).into()
}
