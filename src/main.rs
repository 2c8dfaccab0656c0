//! session-guard operator CLI.
//!
//! Runs revocation checks against a JSON-backed store with the same breaker
//! and fail-closed policy the library applies in production.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use session_guard::config::{load_config, GuardConfig};
use session_guard::observability::{logging, metrics};
use session_guard::session::{ConnectionProvider, Disconnected, MemoryStore, RevocationGuard};

#[derive(Parser)]
#[command(name = "session-guard")]
#[command(about = "Fail-closed session revocation checks", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether sessions are revoked
    Check {
        /// JSON file of revoked sessions (id -> reason). Without it the store is unavailable.
        #[arg(short, long)]
        store: Option<PathBuf>,

        #[arg(required = true)]
        session_ids: Vec<String>,
    },
    /// Record a revocation in a JSON store file
    Revoke {
        #[arg(short, long)]
        store: PathBuf,

        session_id: String,

        #[arg(short, long, default_value = "revoked by operator")]
        reason: String,
    },
    /// Load and validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::Check { store, session_ids } => {
            let provider: Arc<dyn ConnectionProvider> = match store {
                Some(path) => Arc::new(MemoryStore::load_from_file(
                    &path,
                    &config.revocation.key_prefix,
                )?),
                None => Arc::new(Disconnected::new("no store file given")),
            };
            let guard = RevocationGuard::from_config(&config, provider);

            for session_id in &session_ids {
                let decision = guard.check(session_id).await;
                let verdict = if decision.revoked { "revoked" } else { "valid" };
                println!("{}\t{}\t{}", session_id, verdict, decision.reason);
            }

            let snapshot = guard.breaker_snapshot();
            tracing::info!(
                breaker = %snapshot.name,
                state = %snapshot.state,
                failures = snapshot.failure_count,
                "Checks finished"
            );
        }
        Commands::Revoke {
            store,
            session_id,
            reason,
        } => {
            let records = MemoryStore::load_from_file(&store, &config.revocation.key_prefix)?;
            records.revoke(&session_id, reason);
            records.save_to_file()?;
            println!("{}\trevoked", session_id);
        }
        Commands::Validate => {
            println!(
                "configuration ok: breaker '{}' (threshold {}, cooldown {}ms)",
                config.breaker.name, config.breaker.failure_threshold, config.breaker.cooldown_ms
            );
        }
    }

    Ok(())
}
