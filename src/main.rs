//! Scholar-Harvest main entry point
//!
//! This is the command-line interface for the Scholar-Harvest pipeline.

use clap::{Parser, Subcommand};
use scholar_harvest::config::{load_config_with_hash, Config};
use scholar_harvest::crawler::run_crawl;
use scholar_harvest::extraction::{run_extraction, run_scoring, OpenAiExtractor};
use scholar_harvest::output::{load_statistics, print_crawl_summary, print_statistics};
use scholar_harvest::storage::FileStorage;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Scholar-Harvest: a bounded scholarship site harvester
///
/// Crawls the configured scholarship websites, keeps a resumable per-site
/// store of page text, extracts structured scholarship records and scores
/// them against your credentials.
#[derive(Parser, Debug)]
#[command(name = "scholar-harvest")]
#[command(version)]
#[command(about = "A bounded scholarship site harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Crawl every registered site, resuming from the stored ledgers
    Crawl,
    /// Extract structured scholarship records from the crawled text
    Extract,
    /// Score processed scholarships against the credentials
    Score,
    /// Crawl, then extract
    All,
    /// Show per-site store statistics and exit
    Stats,
    /// Validate config and show what would be crawled without crawling
    DryRun,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Crawl => handle_crawl(&config).await?,
        Command::Extract => handle_extract(&config).await?,
        Command::Score => handle_score(&config).await?,
        Command::All => {
            handle_crawl(&config).await?;
            handle_extract(&config).await?;
        }
        Command::Stats => handle_stats(&config)?,
        Command::DryRun => handle_dry_run(&config),
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scholar_harvest=info,warn"),
            1 => EnvFilter::new("scholar_harvest=debug,info"),
            2 => EnvFilter::new("scholar_harvest=trace,debug"),
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

/// Handles the dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Scholar-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max iterations: {}", config.crawler.max_iterations);
    println!(
        "  Max depth: {} ({:?} mode)",
        config.crawler.max_depth, config.crawler.depth_mode
    );
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!(
        "  Excluded extensions: {}",
        config.crawler.exclude_extensions.join(" ")
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Scrape: {}", config.output.scrape_dir.display());
    println!("  Processed: {}", config.output.process_dir.display());
    println!("  Credentials: {}", config.output.credentials_dir.display());
    println!("  Results: {}", config.output.results_dir.display());

    println!("\nExtraction:");
    println!("  Endpoint: {}", config.extraction.base_url);
    println!("  Model: {}", config.extraction.model);
    println!("  API key variable: {}", config.extraction.api_key_env);

    let registry = config.registry();
    println!("\nSites ({}):", registry.len());
    for site in &registry {
        println!("  - {} -> {}", site.name, site.domain);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the stats mode: shows ledger and page counts per site
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Store directory: {}\n", config.output.scrape_dir.display());

    let mut storage = FileStorage::new(&config.output.scrape_dir)?;
    let stats = load_statistics(&mut storage, &config.registry())?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the crawl stage, cancelling cleanly on Ctrl-C
async fn handle_crawl(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            ctrl_c_token.cancel();
        }
    });

    tracing::info!("Starting crawl of {} sites", config.sites.len());
    match run_crawl(config, cancel).await {
        Ok(outcomes) => {
            print_crawl_summary(&outcomes);
            tracing::info!("Crawl completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the extraction stage
async fn handle_extract(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OpenAiExtractor::from_config(&config.extraction)?;

    tracing::info!("Starting post-crawl processing...");
    let summary = run_extraction(config, &extractor).await?;
    tracing::info!(
        "Processing completed: {} processed, {} failed",
        summary.processed.len(),
        summary.failed.len()
    );

    Ok(())
}

/// Handles the scoring stage
async fn handle_score(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let scorer = OpenAiExtractor::from_config(&config.extraction)?;

    let summary = run_scoring(config, &scorer).await?;
    for (scholarship, score) in &summary.scored {
        println!("  {}: {}%", scholarship, score);
    }
    tracing::info!(
        "Eligibility evaluation completed: {} scored, {} failed",
        summary.scored.len(),
        summary.failed.len()
    );

    Ok(())
}
