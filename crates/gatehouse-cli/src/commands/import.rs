//! Import command - load tenants and identities from a JSON file.
//!
//! ```json
//! {
//!   "tenants": [{ "id": 1, "name": "North Campus", "package_id": "edu.north.gate" }],
//!   "identities": [{
//!     "id": 10, "name": "Ada", "credential_id": "STU-0010", "role": "STUDENT",
//!     "valid_until": "2027-06-30T00:00:00Z", "tenant_id": 1
//!   }]
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use gatehouse_core::{Identity, IdentityId, Role, SigningSecret, Tenant, TenantId, Timestamp};
use gatehouse_crypto::CredentialCipher;
use gatehouse_storage::GateStore;
use serde::Deserialize;

use crate::theme::Theme;

/// Top-level import document.
#[derive(Debug, Deserialize)]
pub(crate) struct ImportFile {
    #[serde(default)]
    tenants: Vec<Tenant>,
    #[serde(default)]
    identities: Vec<ImportIdentity>,
}

/// An identity as written by hand: `active` defaults to true and the QR
/// secret may be left out.
#[derive(Debug, Deserialize)]
struct ImportIdentity {
    id: IdentityId,
    name: String,
    #[serde(default)]
    email: Option<String>,
    credential_id: String,
    #[serde(default)]
    qr_secret: Option<SigningSecret>,
    role: Role,
    #[serde(default = "default_active")]
    active: bool,
    valid_until: Timestamp,
    #[serde(default)]
    tenant_id: Option<TenantId>,
}

fn default_active() -> bool {
    true
}

/// What an import wrote.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub(crate) tenants: usize,
    pub(crate) identities: usize,
    pub(crate) generated_secrets: usize,
}

/// Options for [`import_records`].
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ImportOptions<'a> {
    /// Seal raw credential identifiers with this cipher before storing.
    pub(crate) seal_with: Option<&'a CredentialCipher>,
    /// Generate a QR secret for identities that have none.
    pub(crate) generate_qr_secrets: bool,
}

/// Write every tenant, then every identity, stopping at the first failure.
pub(crate) async fn import_records(
    store: &dyn GateStore,
    file: ImportFile,
    options: ImportOptions<'_>,
) -> anyhow::Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for tenant in &file.tenants {
        store
            .save_tenant(tenant)
            .await
            .with_context(|| format!("failed to import tenant {}", tenant.id))?;
        summary.tenants = summary.tenants.saturating_add(1);
    }

    for entry in file.identities {
        let credential_id = match options.seal_with {
            Some(cipher) => cipher.encrypt(&entry.credential_id)?,
            None => entry.credential_id,
        };
        let qr_secret = match entry.qr_secret {
            Some(secret) => Some(secret),
            None if options.generate_qr_secrets => {
                summary.generated_secrets = summary.generated_secrets.saturating_add(1);
                Some(SigningSecret::generate())
            },
            None => None,
        };
        let identity = Identity {
            id: entry.id,
            name: entry.name,
            email: entry.email,
            credential_id,
            qr_secret,
            role: entry.role,
            active: entry.active,
            valid_until: entry.valid_until,
            tenant_id: entry.tenant_id,
        };
        store
            .save_identity(&identity)
            .await
            .with_context(|| format!("failed to import identity {}", identity.id))?;
        summary.identities = summary.identities.saturating_add(1);
    }

    Ok(summary)
}

/// Read `path` and import it.
pub(crate) async fn run(
    store: &dyn GateStore,
    path: &Path,
    options: ImportOptions<'_>,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: ImportFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let summary = import_records(store, file, options).await?;
    println!(
        "{}",
        Theme::success(&format!(
            "Imported {} tenant(s) and {} identit(y/ies)",
            summary.tenants, summary.identities
        ))
    );
    if summary.generated_secrets > 0 {
        println!(
            "{}",
            Theme::info(&format!(
                "Generated {} QR secret(s)",
                summary.generated_secrets
            ))
        );
    }
    Ok(())
}
