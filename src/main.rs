//! Listing Scout main entry point
//!
//! This is the command-line interface: it builds the run configuration,
//! renders progress events, and writes the enriched listings as CSV.

use anyhow::Context;
use clap::Parser;
use listing_scout::config::{
    high_load_warnings, load_config, load_settings, save_settings, validate, Config, Settings,
};
use listing_scout::crawler::IdentityPool;
use listing_scout::discovery::MapsSource;
use listing_scout::output::{print_statistics, write_listings_csv};
use listing_scout::{EventSink, Orchestrator, ProgressEvent};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Listing Scout: business listing discovery and contact enrichment
///
/// Searches a maps service for businesses matching QUERY, then crawls each
/// business website (same host only, bounded depth and page budget) for
/// emails, phone numbers, postal addresses and social media profiles.
#[derive(Parser, Debug)]
#[command(name = "listing-scout")]
#[command(version)]
#[command(about = "Business listing discovery and contact enrichment", long_about = None)]
struct Cli {
    /// Search query, e.g. "dentists in Lyon"
    #[arg(value_name = "QUERY", required_unless_present = "dry_run")]
    query: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Load the saved settings document (max depth, max pages, flags)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Save the effective settings document before running
    #[arg(long, value_name = "FILE")]
    save_settings: Option<PathBuf>,

    /// Number of listings to collect (1-200)
    #[arg(long)]
    max_results: Option<u32>,

    /// Maximum link depth followed on each website
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum pages fetched per website
    #[arg(long)]
    max_pages: Option<u32>,

    /// Number of websites crawled concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Show the browser window during discovery
    #[arg(long)]
    non_headless: bool,

    /// Skip the robots.txt check
    #[arg(long)]
    no_robots: bool,

    /// Path of the CSV results table
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and print it without running
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if let Some(path) = &cli.save_settings {
        save_settings(path, &Settings::from_config(&config))
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        tracing::info!("Settings saved to {}", path.display());
    }

    for warning in high_load_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    if cli.dry_run {
        handle_dry_run(&config, cli.query.as_deref());
        return Ok(());
    }

    let query = cli.query.unwrap_or_default();
    handle_run(config, &query).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_scout=info,warn"),
            1 => EnvFilter::new("listing_scout=debug,info"),
            _ => EnvFilter::new("listing_scout=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers defaults, the TOML file, the settings document and CLI flags
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(path) = &cli.settings {
        load_settings(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?
            .apply_to(&mut config);
    }

    if let Some(max_results) = cli.max_results {
        config.discovery.max_results = max_results;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if cli.non_headless {
        config.discovery.non_headless = true;
    }
    if cli.no_robots {
        config.crawler.check_robots = false;
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config, query: Option<&str>) {
    println!("=== Listing Scout Dry Run ===\n");

    if let Some(query) = query {
        println!("Query: {}\n", query);
    }

    println!("Discovery:");
    println!("  Max results: {}", config.discovery.max_results);
    println!("  Headless: {}", !config.discovery.non_headless);
    println!("  Retry attempts: {}", config.discovery.retry_attempts);

    println!("\nCrawler:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages per website: {}", config.crawler.max_pages);
    println!("  Check robots.txt: {}", config.crawler.check_robots);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);

    println!("\nUser Agents ({}):", config.user_agent.pool.len());
    for agent in &config.user_agent.pool {
        println!("  - {}", agent);
    }

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main run: discovery, crawl stage, CSV output
async fn handle_run(config: Config, query: &str) -> anyhow::Result<()> {
    let (events, receiver) = EventSink::channel();
    let cancel = CancellationToken::new();

    let consumer = tokio::spawn(render_events(receiver));

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            interrupt.cancel();
        }
    });

    let identities =
        IdentityPool::from_config(&config.user_agent).context("Invalid user-agent pool")?;
    let mut source = MapsSource::new(config.discovery.clone(), identities);
    let csv_path = PathBuf::from(&config.output.csv_path);

    let orchestrator = Orchestrator::new(config, events, cancel);
    let result = orchestrator.run(&mut source, query).await;

    // Closing the last sink lets the consumer drain and exit
    drop(orchestrator);
    if let Err(e) = consumer.await {
        tracing::debug!("Event consumer ended abnormally: {}", e);
    }

    let report = result.context("Run failed")?;

    write_output(&csv_path, &report.listings)?;
    print_statistics(&report.statistics);

    Ok(())
}

fn write_output(path: &Path, listings: &[listing_scout::Listing]) -> anyhow::Result<()> {
    write_listings_csv(path, listings)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    println!("✓ Results written to: {}\n", path.display());
    Ok(())
}

/// Renders progress events as log lines
async fn render_events(mut receiver: UnboundedReceiver<ProgressEvent>) {
    let mut last_reported: Option<f64> = None;

    while let Some(event) = receiver.recv().await {
        match event {
            ProgressEvent::Log(line) => tracing::info!("{}", line),
            ProgressEvent::Progress(percent) => {
                let due = match last_reported {
                    Some(last) => percent - last >= 5.0 || (percent >= 100.0 && last < 100.0),
                    None => true,
                };
                if due {
                    tracing::info!("Progress: {:.0}%", percent);
                    last_reported = Some(percent);
                }
            }
            ProgressEvent::PageVisited { .. } => {}
            ProgressEvent::TaskFinished {
                listing,
                state,
                pages_visited,
            } => {
                tracing::debug!(
                    "Listing {} finished: {} after {} pages",
                    listing,
                    state,
                    pages_visited
                );
            }
        }
    }
}
