//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest content harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sumi_harvest::config::{load_config_with_hash, Config};
use sumi_harvest::crawler::{ChromeRenderer, TokioSleeper};
use sumi_harvest::output::{
    default_output_path, format_output, print_statistics, write_output, HarvestStatistics,
};
use sumi_harvest::Harvester;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a polite content harvester
///
/// Sumi-Harvest crawls web pages, listing pages and PDF documents, extracts
/// readable content as Markdown, classifies it, and writes the records for a
/// team and user to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite content harvester", long_about = None)]
struct Cli {
    /// Team the harvested records belong to
    #[arg(value_name = "TEAM_ID")]
    team_id: String,

    /// User the harvested records are attributed to
    #[arg(value_name = "USER_ID")]
    user_id: String,

    /// URLs to harvest (pages, listing pages, PDFs, Drive links)
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file (default: scraped_data_<TEAM_ID>_<USER_ID>.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Disable the headless browser and fetch pages statically only
    #[arg(long)]
    no_render: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let renderer = if config.render.enabled && !cli.no_render {
        let renderer = ChromeRenderer::launch(
            &config.render,
            &config.crawler.user_agent,
            Arc::new(TokioSleeper),
        )
        .await
        .context("failed to launch headless browser")?;
        Some(Arc::new(renderer))
    } else {
        tracing::info!("Rendering disabled; pages are fetched statically");
        None
    };

    let min_content_length = config.filters.min_content_length;
    let mut builder = Harvester::builder(config);
    if let Some(renderer) = &renderer {
        builder = builder.renderer(renderer.clone());
    }
    let harvester = builder.build().context("failed to set up harvester")?;

    let result = harvester.harvest(&cli.urls, &cli.user_id).await;

    // Release the browser on every exit path
    drop(harvester);
    if let Some(renderer) = renderer {
        match Arc::try_unwrap(renderer) {
            Ok(renderer) => renderer.close().await,
            Err(_) => tracing::warn!("Browser still in use; aborting its handler"),
        }
    }

    let records = result.context("harvest aborted")?;

    let document = format_output(&cli.team_id, records, min_content_length);
    let path = cli
        .output
        .unwrap_or_else(|| default_output_path(&cli.team_id, &cli.user_id));
    write_output(&document, &path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if !cli.quiet {
        print_statistics(&HarvestStatistics::from_records(&document.items));
    }

    Ok(())
}

/// Sets up logging based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
