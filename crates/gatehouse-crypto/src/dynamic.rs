//! Dynamic QR token codec.
//!
//! Wire format: `<identityId>:<epochMillis>:<signature>` where the signature
//! is [`sign`](crate::signature::sign) over `<identityId>:<epochMillis>`.

use std::fmt;
use std::str::FromStr;

use crate::error::{CryptoError, CryptoResult};
use crate::signature;

/// Default freshness window for dynamic tokens, in milliseconds.
pub const DEFAULT_QR_WINDOW_MILLIS: u64 = 30_000;

const SEPARATOR: char = ':';

/// A parsed dynamic QR token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicToken {
    /// Numeric identity ID the token claims.
    pub identity_id: u64,
    /// Issue time in milliseconds since the Unix epoch.
    pub issued_at_millis: i64,
    /// URL-safe base64 HMAC signature.
    pub signature: String,
}

impl DynamicToken {
    /// Issue a signed token for `identity_id` at `issued_at_millis`.
    #[must_use]
    pub fn issue(identity_id: u64, issued_at_millis: i64, secret: &str) -> Self {
        let payload = Self::signed_payload(identity_id, issued_at_millis);
        Self {
            identity_id,
            issued_at_millis,
            signature: signature::sign(&payload, secret),
        }
    }

    /// Parse the wire form.
    ///
    /// Exactly three `:`-separated parts are required, the first two numeric
    /// and the last non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedToken`] on any structural problem.
    pub fn parse(input: &str) -> CryptoResult<Self> {
        let parts: Vec<&str> = input.split(SEPARATOR).collect();
        let [id, ts, sig] = parts.as_slice() else {
            return Err(CryptoError::MalformedToken(format!(
                "expected 3 parts, got {}",
                parts.len()
            )));
        };

        let identity_id = id
            .parse::<u64>()
            .map_err(|_| CryptoError::MalformedToken("identity id is not numeric".into()))?;
        let issued_at_millis = ts
            .parse::<i64>()
            .map_err(|_| CryptoError::MalformedToken("timestamp is not numeric".into()))?;
        if sig.is_empty() {
            return Err(CryptoError::MalformedToken("empty signature".into()));
        }

        Ok(Self {
            identity_id,
            issued_at_millis,
            signature: (*sig).to_string(),
        })
    }

    /// The bytes covered by the signature: `<identityId>:<epochMillis>`.
    #[must_use]
    pub fn signed_payload(identity_id: u64, issued_at_millis: i64) -> String {
        format!("{identity_id}{SEPARATOR}{issued_at_millis}")
    }

    /// Whether the signature verifies under `secret`.
    #[must_use]
    pub fn verify(&self, secret: &str) -> bool {
        let payload = Self::signed_payload(self.identity_id, self.issued_at_millis);
        signature::verify(&payload, secret, &self.signature)
    }

    /// Whether the token was issued within `window_millis` of `now_millis`.
    ///
    /// Skew in either direction counts; a difference equal to the window is fresh.
    #[must_use]
    pub fn is_fresh(&self, now_millis: i64, window_millis: u64) -> bool {
        self.issued_at_millis.abs_diff(now_millis) <= window_millis
    }
}

impl FromStr for DynamicToken {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DynamicToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.identity_id, self.issued_at_millis, self.signature
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_issue_then_parse() {
        let token = DynamicToken::issue(42, NOW, "seed");
        let wire = token.to_string();
        assert!(wire.starts_with("42:1700000000000:"));
        let parsed: DynamicToken = wire.parse().unwrap();
        assert_eq!(parsed, token);
        assert!(parsed.verify("seed"));
    }

    #[test]
    fn test_structure_rejections() {
        for bad in [
            "",
            "card-0001",
            "42:1700000000000",
            "42:1700000000000:sig:extra",
            "abc:1700000000000:sig",
            "42:yesterday:sig",
            "42:1700000000000:",
            "-1:1700000000000:sig",
        ] {
            assert!(
                matches!(DynamicToken::parse(bad), Err(CryptoError::MalformedToken(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_freshness_boundary() {
        let token = DynamicToken::issue(1, NOW, "seed");
        assert!(token.is_fresh(NOW, DEFAULT_QR_WINDOW_MILLIS));
        assert!(token.is_fresh(NOW + 30_000, DEFAULT_QR_WINDOW_MILLIS));
        assert!(token.is_fresh(NOW - 30_000, DEFAULT_QR_WINDOW_MILLIS));
        assert!(!token.is_fresh(NOW + 30_001, DEFAULT_QR_WINDOW_MILLIS));
        assert!(!token.is_fresh(NOW - 30_001, DEFAULT_QR_WINDOW_MILLIS));
    }

    #[test]
    fn test_tampered_fields_fail_verification() {
        let token = DynamicToken::issue(7, NOW, "seed");
        let mut shifted = token.clone();
        shifted.issued_at_millis += 1;
        assert!(!shifted.verify("seed"));

        let mut other_id = token.clone();
        other_id.identity_id = 8;
        assert!(!other_id.verify("seed"));

        assert!(!token.verify(""));
    }
}
