//! Parcel-Scout main entry point
//!
//! This is the command-line interface for the Parcel-Scout listing harvester.

use clap::Parser;
use parcel_scout::config::load_config_with_hash;
use parcel_scout::crawl::{CrawlController, SearchCriteria};
use parcel_scout::fetch::{IdentityPool, RateLimitedFetcher};
use parcel_scout::pipeline::PipelineCoordinator;
use parcel_scout::record::{RawListingRecord, SourceId};
use parcel_scout::sources::PortalAdapter;
use parcel_scout::storage::{ListingSink, SqliteSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Parcel-Scout: a rate-limited real estate listing harvester
///
/// Parcel-Scout crawls listing portals under strict rate limits, then
/// validates, normalizes, deduplicates, and enriches what it finds before
/// writing clean listings to a local database.
#[derive(Parser, Debug)]
#[command(name = "parcel-scout")]
#[command(version = "0.1.0")]
#[command(about = "A rate-limited real estate listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Portal to harvest (zillow, redfin, apartments_com)
    #[arg(long, default_value = "zillow")]
    source: String,

    /// Portal root URL (defaults to the portal's public site)
    #[arg(long)]
    base_url: Option<String>,

    /// Location to search (city, zip, neighborhood)
    #[arg(long)]
    location: Option<String>,

    /// Minimum price in whole dollars
    #[arg(long)]
    min_price: Option<i64>,

    /// Maximum price in whole dollars
    #[arg(long)]
    max_price: Option<i64>,

    /// Minimum bedroom count
    #[arg(long)]
    min_bedrooms: Option<u32>,

    /// Stop after this many listings
    #[arg(long)]
    max_results: Option<usize>,

    /// Also fetch each listing's detail page
    #[arg(long)]
    details: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let source = SourceId::parse(&cli.source)
        .ok_or_else(|| format!("unknown source: {}", cli.source))?;

    if cli.dry_run {
        handle_dry_run(&config, source, &cli);
        return Ok(());
    }

    let location = cli
        .location
        .clone()
        .ok_or("--location is required unless --dry-run is set")?;

    handle_harvest(config, config_hash, source, location, cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("parcel_scout=info,warn"),
            1 => EnvFilter::new("parcel_scout=debug,info"),
            2 => EnvFilter::new("parcel_scout=trace,debug"),
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

fn default_base_url(source: SourceId) -> &'static str {
    match source {
        SourceId::Zillow => "https://www.zillow.com",
        SourceId::Redfin => "https://www.redfin.com",
        SourceId::ApartmentsCom => "https://www.apartments.com",
    }
}

/// Handles the --dry-run mode: validates config and shows the effective setup
fn handle_dry_run(config: &parcel_scout::Config, source: SourceId, cli: &Cli) {
    println!("=== Parcel-Scout Dry Run ===\n");

    println!("Fetch:");
    println!("  Requests per minute: {}", config.fetch.requests_per_minute);
    println!(
        "  Delay between requests: {}ms",
        config.fetch.delay_between_requests_ms
    );
    println!(
        "  Jitter: {}-{}ms",
        config.fetch.jitter_min_ms, config.fetch.jitter_max_ms
    );
    println!("  Max retries: {}", config.fetch.max_retries);

    println!("\nIdentity:");
    println!("  User agents: {}", config.identity.user_agents.len());
    println!("  Proxies: {}", config.identity.proxies.len());

    println!("\nDeduplication:");
    println!(
        "  Similarity threshold: {}",
        config.dedup.similarity_threshold
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSource:");
    println!("  Portal: {}", source);
    println!(
        "  Base URL: {}",
        cli.base_url.as_deref().unwrap_or(default_base_url(source))
    );
    if let Some(location) = &cli.location {
        println!("  Location: {}", location);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation: crawl, then pipeline
async fn handle_harvest(
    config: parcel_scout::Config,
    config_hash: String,
    source: SourceId,
    location: String,
    cli: Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let sink = Arc::new(SqliteSink::new(Path::new(&config.output.database_path))?);
    let run_id = sink.begin_run(&config_hash)?;
    tracing::info!(run_id, "starting harvest run");

    let base_url = cli
        .base_url
        .unwrap_or_else(|| default_base_url(source).to_string());
    let adapter = Arc::new(PortalAdapter::new(source, &base_url)?);

    let fetcher = Arc::new(RateLimitedFetcher::new(
        config.fetch.clone(),
        IdentityPool::new(&config.identity),
    ));

    let mut criteria = SearchCriteria::for_location(location)
        .with_price_range(cli.min_price, cli.max_price)
        .with_bedrooms(cli.min_bedrooms, None);
    if let Some(max) = cli.max_results {
        criteria = criteria.with_max_results(max);
    }
    if cli.details {
        criteria = criteria.with_details();
    }

    let mut controller =
        CrawlController::new(adapter.clone(), fetcher, criteria, config.fetch.max_retries);

    // Keep whatever was scraped before an error; a partial crawl still feeds
    // the pipeline
    let mut records: Vec<RawListingRecord> = Vec::new();
    loop {
        match controller.next().await {
            Ok(Some(record)) => records.push(record),
            Ok(None) => break,
            Err(e) => {
                tracing::error!("crawl stopped early: {e}");
                break;
            }
        }
    }
    tracing::info!(count = records.len(), "crawl finished");
    if adapter.skipped_card_count() > 0 {
        tracing::warn!(
            skipped = adapter.skipped_card_count(),
            "some result cards could not be parsed; the portal markup may have changed"
        );
    }

    let coordinator =
        PipelineCoordinator::new(&config, sink.clone() as Arc<dyn ListingSink>);
    let result = coordinator.run(records);

    println!("=== Harvest Summary ===");
    println!("  Input records:  {}", result.input);
    println!("  Valid:          {}", result.valid);
    println!("  Invalid:        {}", result.invalid);
    println!("  Duplicates:     {}", result.duplicates);
    println!("  Persisted:      {}", result.persisted);
    if result.not_processed > 0 {
        println!("  Not processed:  {}", result.not_processed);
    }
    if result.not_persisted > 0 {
        println!("  Not persisted:  {}", result.not_persisted);
    }
    println!("  Elapsed:        {:.2}s", result.elapsed.as_secs_f64());

    if !result.errors.is_empty() {
        println!("\nSampled errors:");
        for error in &result.errors {
            println!("  - {error}");
        }
    }

    println!("\n✓ {} listings now in {}", sink.count()?, config.output.database_path);

    Ok(())
}
