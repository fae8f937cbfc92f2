//! Gatehouse Crypto - Credential sealing and dynamic QR signatures.
//!
//! This crate provides:
//! - AES-256-GCM sealing of credential identifiers at rest
//! - HMAC-SHA256 signing and constant-time verification of QR payloads
//! - The `<identityId>:<epochMillis>:<signature>` dynamic token codec
//!
//! # Security Model
//!
//! Every failure is a rejection. A sealed value that fails to authenticate,
//! a token that fails to parse, or a secret that is empty never yields a
//! partial result.
//!
//! # Example
//!
//! ```
//! use gatehouse_crypto::{CredentialCipher, DynamicToken};
//!
//! let cipher = CredentialCipher::generate();
//! let sealed = cipher.encrypt("card-0001").unwrap();
//! assert_eq!(cipher.decrypt(&sealed).unwrap(), "card-0001");
//!
//! let token = DynamicToken::issue(42, 1_700_000_000_000, "seed");
//! let parsed = DynamicToken::parse(&token.to_string()).unwrap();
//! assert!(parsed.verify("seed"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod cipher;
mod dynamic;
mod error;
pub mod signature;

pub use cipher::{CredentialCipher, KEY_LENGTH, NONCE_LENGTH, TAG_LENGTH};
pub use dynamic::{DEFAULT_QR_WINDOW_MILLIS, DynamicToken};
pub use error::{CryptoError, CryptoResult};
