//! Meili Sync Main Entry Point
//!
//! Operator command line for the Meilisearch sync service: bulk reindexing,
//! connection diagnostics, per-lot repair and the task webhook server.

use std::env;
use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use meili_sync::{webhook, Dependencies, IndexingError};
use meili_sync_repository::RecordSource;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "meili-sync")]
#[command(about = "Keeps Meilisearch indexes in sync with inventory records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-index every lot in rate-limited batches
    Reindex,
    /// Check credentials and service health
    TestConnection,
    /// Push specific lots to the index
    IndexLots {
        /// Lot ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Remove specific lots from the index
    RemoveLots {
        /// Lot ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Run the task webhook server until Ctrl-C
    ServeWebhook {
        /// Bind address, overrides WEBHOOK_ADDR
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("meili_sync=info,meili_sync_repository=info"));

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| IndexingError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "meili-sync",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| IndexingError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "meili-sync",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> Result<(), IndexingError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| IndexingError::config(format!("Failed to render output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

async fn run(command: Commands, deps: Dependencies) -> Result<(), IndexingError> {
    match command {
        Commands::Reindex => {
            let mut reconciler = deps.lot_reconciler()?;
            let report = reconciler.run().await;
            print_json(&report.notification())?;
            if report.is_success() {
                Ok(())
            } else {
                Err(IndexingError::ReindexIncomplete(
                    report.notification().message,
                ))
            }
        }
        Commands::TestConnection => {
            let report = deps.provider.test_connection().await?;
            println!("{}", report.message());
            Ok(())
        }
        Commands::IndexLots { ids } => {
            let lots = deps.lot_source()?.fetch_by_ids(&ids).await?;
            info!(requested = ids.len(), found = lots.len(), "Indexing lots");
            let count = deps.lot_hooks().index(&lots).await?;
            println!("Indexed {} lots", count);
            Ok(())
        }
        Commands::RemoveLots { ids } => {
            let lots: Vec<_> = ids
                .iter()
                .map(|id| meili_sync_shared::LotRecord::with_id(*id))
                .collect();
            let count = deps.lot_hooks().remove(&lots).await?;
            println!("Removed {} lots", count);
            Ok(())
        }
        Commands::ServeWebhook { addr } => {
            let addr = addr.unwrap_or(deps.settings.webhook_addr);
            webhook::run_server(addr, shutdown_signal()).await?;
            info!("Webhook server stopped");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    let cli = Cli::parse();

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match run(cli.command, deps).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
