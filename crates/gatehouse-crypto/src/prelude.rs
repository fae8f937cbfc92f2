//! Common types for convenient import.
//!
//! ```
//! use gatehouse_crypto::prelude::*;
//! ```

pub use crate::{CredentialCipher, CryptoError, CryptoResult, DynamicToken};
