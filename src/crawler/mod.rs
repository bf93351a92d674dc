//! Crawler module for building the link inventory
//!
//! This module contains the crawl pipeline, including:
//! - The HTTP client adapter shared by every request
//! - HTML parsing of the landing page and listing pages
//! - Category enumeration and pagination probing
//! - The bounded concurrent page crawler
//! - Overall orchestration across categories

mod categories;
mod fetcher;
mod orchestrator;
mod pages;
mod parser;
mod prober;
mod types;

pub use categories::enumerate_categories;
pub use fetcher::{build_http_client, listing_query, Fetcher};
pub use orchestrator::{Orchestrator, RunReport};
pub use pages::{crawl_pages, fetch_page, PageCrawl, PageFetchError};
pub use parser::{is_excluded, parse_categories, parse_listing, ListingPage};
pub use prober::{last_page, parse_total_items, probe, try_probe, ProbeError, ProbeOutcome};
pub use types::{Category, CategoryResult, ListingItem, PageMetadata};

use crate::config::Config;
use crate::output::{write_detail_tasks, write_inventory};
use crate::InventoryError;
use std::path::Path;

/// Runs a complete inventory operation
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client
/// 2. Enumerate categories (aborting if there are none)
/// 3. Probe and crawl each category in turn
/// 4. Write the inventory, and the detail-fetch tasks when configured
///
/// # Arguments
///
/// * `config` - The inventory configuration
/// * `config_hash` - Hash of the configuration file, if one was loaded
///
/// # Returns
///
/// * `Ok(RunReport)` - Results and statistics of the run
/// * `Err(InventoryError)` - Enumeration failed or the output could not be
///   written
pub async fn crawl(config: Config, config_hash: Option<String>) -> Result<RunReport, InventoryError> {
    let mut orchestrator = Orchestrator::new(config)?;
    if let Some(hash) = config_hash {
        orchestrator = orchestrator.with_config_hash(hash);
    }

    let report = orchestrator.run().await?;
    let output = &orchestrator.config().output;

    write_inventory(&report.results, Path::new(&output.inventory_path)).inspect_err(|e| {
        tracing::error!("Could not write inventory {}: {}", output.inventory_path, e)
    })?;
    tracing::info!("Inventory saved to {}", output.inventory_path);

    if let Some(tasks_path) = &output.tasks_path {
        let count = write_detail_tasks(&report.results, Path::new(tasks_path)).inspect_err(|e| {
            tracing::error!("Could not write detail tasks {}: {}", tasks_path, e)
        })?;
        tracing::info!("{} detail-fetch tasks saved to {}", count, tasks_path);
    }

    Ok(report)
}
