//! Gatehouse CLI - gate access verification.
//!
//! Operates directly on the embedded store: enroll identities, seal card
//! identifiers, issue QR tokens, run scans, and read the audit history.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gatehouse_config::{Config, CredentialStorage, ResolvedConfig};

mod commands;
mod config_bridge;
mod theme;

use commands::{config, history, import, keys, qr, verify};

/// Gatehouse - campus gate access verification
#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to an additional configuration file (merged last)
    #[arg(short, long, global = true, env = "GATEHOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new credential key
    Keygen,

    /// Seal a raw credential identifier
    Seal {
        /// Raw identifier (e.g. a student number)
        value: String,
    },

    /// Recover the raw identifier from a sealed one
    Unseal {
        /// Sealed identifier
        value: String,
    },

    /// Issue a dynamic QR token for an enrolled identity
    Qr {
        /// Identity ID
        identity_id: u64,
    },

    /// Import tenants and identities from a JSON file
    Import {
        /// Path to the JSON document
        file: PathBuf,

        /// Generate QR secrets for identities without one
        #[arg(long)]
        generate_qr_secrets: bool,

        /// Credential identifiers in the file are already sealed
        #[arg(long)]
        already_sealed: bool,
    },

    /// Run a scan through the engine
    Verify {
        /// Scanned string (sealed identifier or QR token)
        credential: String,

        /// ID of the guard or admin operating the gate
        #[arg(short, long)]
        actor: u64,

        /// Gate or device identifier
        #[arg(short, long, default_value = "cli")]
        gate: String,
    },

    /// Show gate history visible to an actor
    History {
        /// ID of the identity asking
        #[arg(short, long)]
        actor: u64,

        /// Window start (RFC 3339)
        #[arg(long)]
        since: Option<String>,

        /// Window end (RFC 3339), defaults to now
        #[arg(long)]
        until: Option<String>,

        /// Maximum rows
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only the actor's own scans
        #[arg(long)]
        mine: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Only this section (e.g. `history`)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Show config file locations and the store path
    Paths,
}

/// Output rendering for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Colored, human-oriented output.
    Pretty,
    /// Pretty-printed JSON.
    Json,
}

/// Exit status for a scan that was denied.
const EXIT_DENIED: u8 = 2;

fn init_logging(resolved: Option<&ResolvedConfig>, verbose: bool) {
    let mut log_config = resolved
        .and_then(|r| config_bridge::to_log_config(&r.config).ok())
        .unwrap_or_default();
    if verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = gatehouse_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Keygen) {
        init_logging(None, cli.verbose);
        keys::keygen();
        return Ok(ExitCode::SUCCESS);
    }

    let resolved = Config::load(cli.config.as_deref())?;
    init_logging(Some(&resolved), cli.verbose);
    let cfg = &resolved.config;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Pretty
    };

    match cli.command {
        Commands::Keygen => {},
        Commands::Seal { value } => keys::seal(cfg, &value)?,
        Commands::Unseal { value } => keys::unseal(cfg, &value)?,
        Commands::Config { command } => match command {
            ConfigCommands::Show { section } => {
                config::show(&resolved, cli.json, section.as_deref())?;
            },
            ConfigCommands::Paths => config::paths(&resolved)?,
        },
        Commands::Qr { identity_id } => {
            let store = config_bridge::open_store(cfg)?;
            let result = qr::issue(&store.gate, identity_id).await;
            store.close().await?;
            result?;
        },
        Commands::Import {
            file,
            generate_qr_secrets,
            already_sealed,
        } => {
            let cipher = match cfg.crypto.credential_storage {
                CredentialStorage::Sealed if !already_sealed => {
                    Some(config_bridge::require_cipher(cfg)?)
                },
                _ => None,
            };
            let options = import::ImportOptions {
                seal_with: cipher.as_ref(),
                generate_qr_secrets,
            };
            let store = config_bridge::open_store(cfg)?;
            let result = import::run(store.gate.as_ref(), &file, options).await;
            store.close().await?;
            result?;
        },
        Commands::Verify {
            credential,
            actor,
            gate,
        } => {
            let store = config_bridge::open_store(cfg)?;
            let engine = config_bridge::build_engine(cfg, &store)?;
            let result = async {
                let actor = verify::load_actor(store.gate.as_ref(), actor).await?;
                verify::run(&engine, &actor, &credential, &gate, format).await
            }
            .await;
            store.close().await?;
            if !result? {
                return Ok(ExitCode::from(EXIT_DENIED));
            }
        },
        Commands::History {
            actor,
            since,
            until,
            limit,
            mine,
        } => {
            let store = config_bridge::open_store(cfg)?;
            let engine = config_bridge::build_engine(cfg, &store)?;
            let args = history::HistoryArgs {
                since,
                until,
                limit,
                mine,
            };
            let result = async {
                let actor = verify::load_actor(store.gate.as_ref(), actor).await?;
                history::run(&engine, &actor, &args, format).await
            }
            .await;
            store.close().await?;
            result?;
        },
    }

    Ok(ExitCode::SUCCESS)
}
