//! Authenticated encryption of credential identifiers at rest.
//!
//! Sealed format: URL-safe base64 (no padding) of `nonce(12) || ciphertext || tag(16)`,
//! produced with AES-256-GCM under a single process-wide key.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{CryptoError, CryptoResult};

/// Key length in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// Authentication tag length in bytes (128 bits).
pub const TAG_LENGTH: usize = 16;

/// AES-256-GCM cipher for credential identifiers.
///
/// The key is zeroized on drop and never printed.
#[derive(Clone, ZeroizeOnDrop)]
pub struct CredentialCipher {
    key: [u8; KEY_LENGTH],
}

impl CredentialCipher {
    /// Create from raw key bytes.
    #[must_use]
    pub fn from_key(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Generate a new random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Create from a key slice.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if the slice is not exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let key: [u8; KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self { key })
    }

    /// Create from a hex-encoded key (64 hex characters).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or does not decode to 32 bytes.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes =
            Zeroizing::new(hex::decode(s.trim()).map_err(|_| CryptoError::InvalidHexEncoding)?);
        Self::from_slice(&bytes)
    }

    /// Export the key as hex (careful - sensitive!).
    ///
    /// Only meant for writing freshly generated keys to secure configuration.
    #[must_use]
    pub fn export_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.key))
    }

    fn aead(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key))
    }

    /// Encrypt raw bytes, returning `nonce || ciphertext || tag`.
    ///
    /// A fresh random nonce is drawn on every call.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EncryptionFailed`] if the AEAD rejects the input.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .aead()
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH.saturating_add(ciphertext.len()));
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt `nonce || ciphertext || tag` produced by [`encrypt_bytes`](Self::encrypt_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedCiphertext`] if the input is too short and
    /// [`CryptoError::DecryptionFailed`] if the tag does not verify.
    pub fn decrypt_bytes(&self, sealed: &[u8]) -> CryptoResult<Vec<u8>> {
        if sealed.len() < NONCE_LENGTH.saturating_add(TAG_LENGTH) {
            return Err(CryptoError::MalformedCiphertext(format!(
                "expected at least {} bytes, got {}",
                NONCE_LENGTH.saturating_add(TAG_LENGTH),
                sealed.len()
            )));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LENGTH);
        self.aead()
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Seal a credential identifier into its at-rest text form.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EncryptionFailed`] if the AEAD rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let sealed = self.encrypt_bytes(plaintext.as_bytes())?;
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Open a sealed credential identifier.
    ///
    /// # Errors
    ///
    /// Fails closed on bad base64, short input, tag mismatch, or non-UTF-8 plaintext.
    pub fn decrypt(&self, sealed: &str) -> CryptoResult<String> {
        let bytes = URL_SAFE_NO_PAD
            .decode(sealed.as_bytes())
            .map_err(|_| CryptoError::InvalidBase64Encoding)?;
        let plaintext = self.decrypt_bytes(&bytes)?;
        String::from_utf8(plaintext).map_err(|err| {
            err.into_bytes().zeroize();
            CryptoError::InvalidUtf8
        })
    }

    /// Whether `sealed` is an authentic value produced under this key.
    #[must_use]
    pub fn is_authentic(&self, sealed: &str) -> bool {
        self.decrypt(sealed).is_ok()
    }
}

impl fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}
