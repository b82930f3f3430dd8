//! Listing ingestion runner
//!
//! Loads searches and posts from the data directory, runs every enabled
//! search once and writes merged posts back.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use listing_ingest::{BrowserExt, HttpBrowser, IngestConfig, Ingestion, JsonFileStore, RecordStore};

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Run one marketplace listing ingestion pass")]
struct Cli {
    /// Directory holding searches.json and posts.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Root of the fetched-HTML cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Replace politeness pacing with the short debug delay
    #[arg(long)]
    debug: bool,

    /// Extra attempts for a failing job
    #[arg(long)]
    max_retries: Option<u32>,

    /// Last results page followed per search job
    #[arg(long)]
    max_pages: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,listing_ingest=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    let mut config = IngestConfig::from_env().context("Failed to load ingestion config")?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(dir) = cli.cache_dir {
        config = config.with_cache_dir(dir);
    }
    if cli.debug {
        config = config.with_debug_mode(true);
    }
    if let Some(retries) = cli.max_retries {
        config = config.with_max_retries(retries);
    }
    if let Some(pages) = cli.max_pages {
        config = config.with_max_pages(pages);
    }

    tracing::info!(
        data_dir = %config.data_dir.display(),
        cache_dir = %config.cache_dir.display(),
        debug = config.debug_mode,
        "Starting listing ingestion"
    );

    let store = RecordStore::open(JsonFileStore::new(&config.data_dir))
        .with_context(|| format!("Failed to open record store in {}", config.data_dir.display()))?;
    let browser = HttpBrowser::from_config(&config)
        .context("Failed to build HTTP browser")?
        .rate_limited(config.requests_per_second);

    let mut ingestion = Ingestion::new(&config, browser, store);
    let summary = ingestion.run().await;

    tracing::info!(
        searches = summary.searches,
        jobs = summary.report.executed,
        failed = summary.report.failed,
        continuations = summary.report.continuations,
        new_posts = summary.new_posts(),
        total_posts = summary.posts_after,
        "Ingestion complete"
    );

    Ok(())
}
