//! Verify command - run one scan through the engine.

use gatehouse_core::{Identity, IdentityId};
use gatehouse_gate::{GateEngine, ScanRequest, Verdict};
use gatehouse_storage::GateStore;

use crate::OutputFormat;
use crate::theme::Theme;

/// Load the identity acting at the gate or reading history.
pub(crate) async fn load_actor(store: &dyn GateStore, id: u64) -> anyhow::Result<Identity> {
    store
        .identity_by_id(IdentityId(id))
        .await?
        .ok_or_else(|| anyhow::anyhow!("no identity with id {id}"))
}

/// Scan `credential` at `gate_id` as `actor` and print the verdict.
///
/// Returns whether the gate opened.
pub(crate) async fn run(
    engine: &GateEngine,
    actor: &Identity,
    credential: &str,
    gate_id: &str,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let verdict = engine
        .scan(actor, &ScanRequest::new(credential, gate_id))
        .await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&verdict)?),
        OutputFormat::Pretty => print_verdict(&verdict, gate_id),
    }
    Ok(verdict.is_allowed())
}

fn print_verdict(verdict: &Verdict, gate_id: &str) {
    println!("\n{}", Theme::header("Gate Verdict"));
    println!("{}", Theme::kv("Status", &Theme::status(verdict.status)));
    println!("{}", Theme::kv("Message", &verdict.message));
    println!("{}", Theme::kv("Name", &verdict.identity_name));
    println!("{}", Theme::kv("Role", &verdict.role));
    println!("{}", Theme::kv("Gate", gate_id));
    println!();
}
