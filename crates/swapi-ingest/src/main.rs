//! SWAPI Ingest - load people from the Star Wars API into PostgreSQL

use anyhow::{Context, Result};
use clap::Parser;
use swapi_common::logging::{init_logging, LogConfig, LogLevel};
use swapi_ingest::config::Config;
use swapi_ingest::fetch::RemoteFetcher;
use swapi_ingest::pipeline::IngestPipeline;
use swapi_ingest::sink::PgPeopleSink;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "swapi-ingest")]
#[command(author, version, about = "Load SWAPI people into PostgreSQL")]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env early so LOG_* variables from it reach the logger
    dotenvy::dotenv().ok();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flag
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("swapi-ingest")
        .filter_directives("sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    let config = Config::load().context("Failed to load configuration")?;

    let sink = PgPeopleSink::connect(&config.database).await?;
    sink.ensure_schema().await?;

    let client = RemoteFetcher::build_client().context("Failed to build HTTP client")?;
    let pipeline = IngestPipeline::from_config(&config.ingest, client, sink)?
        .with_progress_bar(!cli.no_progress);

    let result = pipeline.run().await;
    pipeline.sink().close().await;
    let summary = result?;

    info!(
        "Stored {} of {} people",
        summary.persisted, summary.requested
    );
    Ok(())
}
