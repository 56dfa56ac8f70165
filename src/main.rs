//! Registry crawler main entry point
//!
//! This is the command-line interface for the registry crawler.

use anyhow::Context;
use clap::Parser;
use registry_crawler::config::{load_config_with_hash, Config};
use registry_crawler::crawler::crawl;
use registry_crawler::endpoint::Endpoints;
use registry_crawler::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Registry crawler: harvests a paginated sports-organization registry
///
/// Crawls every configured (region, province) filter, enriches each listed
/// entity with its detail page, and appends one CSV row per distinct entity.
#[derive(Parser, Debug)]
#[command(name = "registry-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Harvests a paginated registry into CSV", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write rows to this file instead of the configured csv-path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(config, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("registry_crawler=info,warn"),
            1 => EnvFilter::new("registry_crawler=debug,info"),
            2 => EnvFilter::new("registry_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the filters and endpoints that would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let endpoints = Endpoints::from_config(&config.site).context("Invalid site endpoints")?;

    println!("=== Registry Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    match config.crawler.list_timeout_ms {
        Some(ms) => println!("  List timeout: {}ms", ms),
        None => println!("  List timeout: none"),
    }
    println!("  Detail timeout: {}ms", config.crawler.detail_timeout_ms);
    println!("  Detail concurrency: {}", config.crawler.detail_concurrency);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Escaping: {:?}", config.output.escaping);

    let filters = config.filters();
    println!("\nFilters ({}):", filters.len());
    for filter in &filters {
        println!(
            "  - {} [{}] -> {}",
            filter,
            filter.province_abbreviation,
            endpoints.list_page(filter, 0)
        );
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Writing {} filters to {}",
        config.filters().len(),
        config.output.csv_path
    );

    let stats = crawl(config).await.context("Crawl aborted")?;

    if !quiet {
        print_statistics(&stats);
    }
    Ok(())
}
