//! QR command - issue a dynamic token for an enrolled identity.

use gatehouse_core::{IdentityId, SigningSecret, Timestamp};
use gatehouse_crypto::DynamicToken;
use gatehouse_storage::{GateStore, KvGateStore};

use crate::theme::Theme;

/// Print a token for `identity_id` signed with its stored QR secret.
pub(crate) async fn issue(store: &KvGateStore, identity_id: u64) -> anyhow::Result<()> {
    let Some(identity) = store.identity_by_id(IdentityId(identity_id)).await? else {
        anyhow::bail!("no identity with id {identity_id}");
    };
    let secret = identity.qr_secret.as_ref().map_or("", SigningSecret::expose);
    if secret.is_empty() {
        anyhow::bail!("identity {identity_id} has no QR secret");
    }

    let token = DynamicToken::issue(identity.id.0, Timestamp::now().as_millis(), secret);
    eprintln!("{}", Theme::info(&format!("QR token for {}", identity.name)));
    println!("{token}");
    Ok(())
}
