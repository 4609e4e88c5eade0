//! Command-line entrypoint for the mobility-data ingestion pipeline.
//!
//! Each subcommand bootstraps its own [`context::AppContext`] rather than
//! relying on a process-wide singleton, so a single binary invocation owns
//! one explicit set of adapters end to end.

mod commands;
mod context;
mod time_window;

use clap::{Parser, Subcommand};

use commands::{extract, provider_config, runtool, sync_db, sync_socrata};

#[derive(Debug, Parser)]
#[command(name = "mds", about = "Scheduled multi-provider MDS ingestion pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch raw trips from a provider and stage them in the object store.
    Extract(extract::ExtractArgs),
    /// Load staged trips from the object store into the warehouse.
    SyncDb(sync_db::SyncDbArgs),
    /// Push warehouse trips for a time range to the public Socrata dataset.
    SyncSocrata(sync_socrata::SyncSocrataArgs),
    /// Run extract, sync-db and sync-socrata in sequence for one provider.
    Runtool(runtool::RuntoolArgs),
    /// Upload or download the provider configuration blob.
    ProviderConfig(provider_config::ProviderConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract(args) => extract::run(args).await,
        Command::SyncDb(args) => sync_db::run(args).await,
        Command::SyncSocrata(args) => sync_socrata::run(args).await,
        Command::Runtool(args) => runtool::run(args).await,
        Command::ProviderConfig(args) => provider_config::run(args).await,
    }
}
