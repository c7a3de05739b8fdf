//! Main entry point for the query-data-downloader CLI

use clap::Parser;
use query_data_downloader::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Set up the tracing subscriber; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("query_data_downloader=info"));

    // The merged CSV may go to stdout; logs always go to stderr.
    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query(ref args) => args.execute().await.map_err(|e| anyhow::anyhow!(e)),
        Commands::Paginated(ref args) => args.execute().await.map_err(|e| anyhow::anyhow!(e)),
        Commands::Period(ref args) => args.execute().await.map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
