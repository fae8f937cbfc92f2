//! History command - list audit records visible to an actor.

use anyhow::Context;
use chrono::DateTime;
use colored::Colorize;
use gatehouse_audit::AuditRecordView;
use gatehouse_core::{Identity, Timestamp};
use gatehouse_gate::GateEngine;

use crate::OutputFormat;
use crate::theme::Theme;

/// Query parameters from the command line.
#[derive(Debug, Default)]
pub(crate) struct HistoryArgs {
    pub(crate) since: Option<String>,
    pub(crate) until: Option<String>,
    pub(crate) limit: Option<usize>,
    pub(crate) mine: bool,
}

/// Parse an RFC 3339 instant.
pub(crate) fn parse_time(raw: &str) -> anyhow::Result<Timestamp> {
    let dt = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid RFC 3339 timestamp: {raw}"))?;
    Ok(Timestamp::from_datetime(dt.to_utc()))
}

/// Run the query and print the rows.
pub(crate) async fn run(
    engine: &GateEngine,
    actor: &Identity,
    args: &HistoryArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let start = args.since.as_deref().map(parse_time).transpose()?;
    let end = args.until.as_deref().map(parse_time).transpose()?;

    let history = engine.history();
    let rows = if args.mine {
        history.my_history(actor, start, end, args.limit).await?
    } else {
        history.query(actor, start, end, args.limit).await?
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Pretty => print_rows(&rows),
    }
    Ok(())
}

fn print_rows(rows: &[AuditRecordView]) {
    if rows.is_empty() {
        println!("{}", Theme::info("No audit records in this window"));
        return;
    }

    println!("\n{}", Theme::header("Gate History"));
    println!(
        "{:<20} {:<8} {:<14} {:<20} {:<12} {}",
        "TIME".dimmed(),
        "STATUS".dimmed(),
        "REASON".dimmed(),
        "NAME".dimmed(),
        "GATE".dimmed(),
        "CAMPUS".dimmed()
    );
    println!("{}", Theme::separator());

    for row in rows {
        let reason = row.reason.map_or("-", |r| r.as_str());
        println!(
            "{:<20} {:<8} {:<14} {:<20} {:<12} {}",
            row.time.0.format("%Y-%m-%d %H:%M:%S"),
            Theme::status(row.status),
            reason,
            row.identity_name,
            row.gate_id,
            row.tenant_name.as_deref().unwrap_or("-")
        );
    }
    println!();
}
