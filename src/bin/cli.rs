//! Roomwatch CLI
//!
//! Local execution entry point for scraping and exporting room prices.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use roomwatch::{
    error::Result,
    models::{Config, format_date},
    pipeline::{self, StoreInfo},
    services::HttpFetcher,
    storage::{LocalStorage, RecordStorage},
    utils::http,
};

/// Roomwatch - Student Accommodation Price Tracker
#[derive(Parser, Debug)]
#[command(
    name = "roomwatch",
    version,
    about = "Tracks student-accommodation room prices over time"
)]

struct Cli {
    /// Path to storage directory containing config and data files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape every configured city and append today's prices
    Scrape,

    /// Rebuild the CSV table from the stored records
    Export,

    /// Validate the configuration file
    Validate,

    /// Show stored record info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let storage = LocalStorage::new(&cli.storage_dir, &config.paths);

    match cli.command {
        Command::Scrape => {
            config.validate()?;
            let client = http::create_client(&config.crawler)?;
            let fetcher = Arc::new(HttpFetcher::new(client));
            let run_date = chrono::Local::now().date_naive();

            let outcome = pipeline::run_scraper(&config, &storage, fetcher, run_date).await?;
            log::debug!("{:?}", outcome);
        }

        Command::Export => {
            let count = pipeline::run_export(&storage).await?;
            log::info!("Exported {} records to {}", count, storage.export_path().display());
        }

        Command::Validate => {
            pipeline::run_validate(&config)?;
        }

        Command::Info => {
            log::info!("Storage: {}", storage.location());
            let records = storage.load_records().await?;
            let info = StoreInfo::from_records(&records);

            log::info!("Records: {}", info.records);
            log::info!("Longest history: {}", info.max_history);
            match info.latest_date {
                Some(date) => log::info!("Last scraped: {}", format_date(date)),
                None => log::info!("No prices recorded yet."),
            }
        }
    }

    Ok(())
}
