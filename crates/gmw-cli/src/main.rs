use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gmw_sync::{MonitorConfig, MonitorPipeline};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Fatal failures leave a readable artifact next to the snapshot file, so a
/// headless scheduled run can be diagnosed after the fact.
const ERROR_ARTIFACT: &str = "error_log.txt";

#[derive(Debug, Parser)]
#[command(name = "gmw-cli")]
#[command(about = "Guitar Market Watch command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch all sources, detect new listings, notify and persist.
    Run {
        /// Path to the persisted snapshot file.
        #[arg(long)]
        data_file: Option<PathBuf>,
        /// Path to the local configuration file; ignored when credentials
        /// come from the environment.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!("fatal: {err:?}");
        write_error_artifact(&err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let Commands::Run { data_file, config } = cli.command.unwrap_or(Commands::Run {
        data_file: None,
        config: None,
    });

    let config = MonitorConfig::load(config.as_deref(), data_file.as_deref())?;
    let pipeline = MonitorPipeline::new(config)?;
    let summary = pipeline.run_once().await?;

    println!(
        "run complete: run_id={} fetched={} new={} high_value={} keyword_hits={} mail_sent={}",
        summary.run_id,
        summary.fetched_records,
        summary.new_records,
        summary.high_value_records,
        summary.keyword_hits,
        summary.mail_sent
    );
    Ok(())
}

fn write_error_artifact(err: &anyhow::Error) {
    let body = format!(
        "run time: {}\nerror: {err}\ndetails:\n{err:?}\n",
        chrono::Utc::now().to_rfc3339()
    );
    if let Err(io_err) = std::fs::write(ERROR_ARTIFACT, body) {
        eprintln!("failed to write {ERROR_ARTIFACT}: {io_err}");
    }
}
