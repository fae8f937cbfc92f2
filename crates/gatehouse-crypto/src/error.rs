//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
///
/// Every variant is a rejection: callers must never fall back to a partially
/// decoded or partially decrypted value.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Invalid hex encoding.
    #[error("invalid hex encoding")]
    InvalidHexEncoding,

    /// Invalid base64 encoding.
    #[error("invalid base64 encoding")]
    InvalidBase64Encoding,

    /// Sealed value is too short or otherwise structurally invalid.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Encryption failed.
    #[error("encryption failed")]
    EncryptionFailed,

    /// Authentication tag did not verify.
    #[error("decryption failed: authentication tag mismatch")]
    DecryptionFailed,

    /// Decrypted bytes are not valid UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    InvalidUtf8,

    /// Dynamic QR token does not match `<id>:<epochMillis>:<signature>`.
    #[error("malformed dynamic token: {0}")]
    MalformedToken(String),
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
