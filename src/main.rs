//! vbpl-inventory main entry point
//!
//! This is the command-line interface for the link inventory builder.

use anyhow::Context;
use clap::Parser;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};
use vbpl_inventory::config::{load_config_with_hash, Config};
use vbpl_inventory::crawler::{crawl, Orchestrator};
use vbpl_inventory::output::print_statistics;

/// vbpl-inventory: a link inventory builder for legal-document listings
///
/// Enumerates the document-type categories of the listing site, crawls every
/// listing page of each category and writes the deduplicated document links
/// per category as JSON.
#[derive(Parser, Debug)]
#[command(name = "vbpl-inventory")]
#[command(version = "1.0.0")]
#[command(about = "Builds a per-category link inventory", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "list_categories")]
    dry_run: bool,

    /// List the document categories and exit
    #[arg(long)]
    list_categories: bool,

    /// Write the inventory here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(output) = &cli.output {
        config.output.inventory_path = output.display().to_string();
    }

    setup_logging(cli.verbose, cli.quiet, Path::new(&config.output.failure_log_path))?;

    match (&cli.config, &config_hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::info!("Using built-in configuration"),
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.list_categories {
        handle_list_categories(config).await?;
    } else {
        handle_crawl(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the console subscriber and the failure log
///
/// The failure log receives every warning and error of the run, so each
/// failed page and an enumeration failure leave a timestamped entry.
fn setup_logging(verbose: u8, quiet: bool, failure_log: &Path) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vbpl_inventory=info,warn"),
            1 => EnvFilter::new("vbpl_inventory=debug,info"),
            2 => EnvFilter::new("vbpl_inventory=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    if let Some(parent) = failure_log.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let log_file = File::options()
        .create(true)
        .append(true)
        .open(failure_log)
        .with_context(|| format!("Failed to open failure log {}", failure_log.display()))?;

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(filter);

    let failures = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(log_file))
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(console)
        .with(failures)
        .init();

    Ok(())
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== vbpl-inventory Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Landing page: {}", config.site.landing_url);
    println!("  Listing page: {}", config.site.listing_url);
    println!("  Agency id: {}", config.site.agency_id);

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.max_workers);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Page timeout: {}s", config.crawler.page_timeout);
    println!(
        "  Default items per page: {}",
        config.crawler.default_items_per_page
    );

    println!("\nUser Agent:");
    println!("  {}", config.http.user_agent);

    println!(
        "\nExcluded Statuses ({}):",
        config.filter.excluded_statuses.len()
    );
    for status in &config.filter.excluded_statuses {
        println!("  - {}", status);
    }

    println!("\nOutput:");
    println!("  Inventory: {}", config.output.inventory_path);
    println!("  Failure log: {}", config.output.failure_log_path);
    if let Some(tasks) = &config.output.tasks_path {
        println!("  Detail tasks: {}", tasks);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --list-categories mode
async fn handle_list_categories(config: Config) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(config)?;
    let categories = orchestrator.enumerate().await?;

    println!("Document categories ({}):", categories.len());
    for category in &categories {
        println!("  {:>6}  {}", category.id, category.name);
    }

    Ok(())
}

/// Handles the main inventory run
async fn handle_crawl(config: Config, config_hash: Option<String>) -> anyhow::Result<()> {
    tracing::info!(
        "Starting inventory run with {} workers, {} excluded statuses",
        config.crawler.max_workers,
        config.filter.excluded_statuses.len()
    );

    // Failures are logged where they happen; anyhow reports them on stderr.
    let report = crawl(config, config_hash).await?;
    print_statistics(&report.statistics);
    Ok(())
}
