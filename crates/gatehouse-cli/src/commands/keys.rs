//! Key commands: generate a credential key, seal and unseal identifiers.

use gatehouse_config::Config;
use gatehouse_crypto::CredentialCipher;

use crate::config_bridge::require_cipher;
use crate::theme::Theme;

/// Print a fresh credential key.
pub(crate) fn keygen() {
    let cipher = CredentialCipher::generate();
    let hex = cipher.export_hex();
    eprintln!("{}", Theme::warning("Store this key securely. Anyone holding it can mint cards."));
    eprintln!(
        "{}",
        Theme::info("Set it as GATEHOUSE_CREDENTIAL_KEY or crypto.credential_key.")
    );
    println!("{}", hex.as_str());
}

/// Seal a raw credential identifier for printing on a card.
pub(crate) fn seal(cfg: &Config, value: &str) -> anyhow::Result<()> {
    let sealed = require_cipher(cfg)?.encrypt(value)?;
    println!("{sealed}");
    Ok(())
}

/// Recover the raw identifier from a sealed one.
pub(crate) fn unseal(cfg: &Config, value: &str) -> anyhow::Result<()> {
    let raw = require_cipher(cfg)?.decrypt(value)?;
    println!("{raw}");
    Ok(())
}
