//! Run statistics
//!
//! Counters accumulated by the orchestrator while it walks the categories,
//! and the end-of-run summary printed from them.

use crate::crawler::PageCrawl;
use chrono::{DateTime, Utc};

/// Per-run statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Categories that produced a result (always all enumerated ones)
    pub categories_processed: u32,

    /// Categories whose first page had no rows
    pub categories_empty: u32,

    /// Categories that fell back to a single page
    pub probes_degraded: u32,

    /// Listing pages requested by the page crawler
    pub pages_attempted: u32,

    /// Listing pages that could not be fetched
    pub pages_failed: u32,

    /// Rows dropped by the status filter
    pub items_excluded: usize,

    /// Rows skipped for lack of a link
    pub items_malformed: usize,

    /// Links across all categories
    pub links_collected: usize,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// SHA-256 of the configuration file, when one was used
    pub config_hash: Option<String>,
}

impl RunStatistics {
    /// Adds the counters of one category's page crawl
    pub fn record_crawl(&mut self, crawl: &PageCrawl) {
        self.pages_attempted += crawl.pages_attempted;
        self.pages_failed += crawl.pages_failed;
        self.items_excluded += crawl.excluded;
        self.items_malformed += crawl.malformed;
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some((finished - started).num_seconds()),
            _ => None,
        }
    }

    /// Share of attempted pages fetched successfully, as a percentage
    pub fn page_success_rate(&self) -> f64 {
        if self.pages_attempted == 0 {
            return 0.0;
        }
        let succeeded = self.pages_attempted - self.pages_failed;
        (succeeded as f64 / self.pages_attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Inventory Statistics ===\n");

    if let Some(started) = stats.started_at {
        println!("Started: {}", started.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!(
            "Duration: {} seconds ({:.2} minutes)",
            duration,
            duration as f64 / 60.0
        );
    }
    if let Some(hash) = &stats.config_hash {
        println!("Config hash: {}", hash);
    }
    println!();

    println!("Categories:");
    println!("  Processed: {}", stats.categories_processed);
    println!("  Empty: {}", stats.categories_empty);
    println!("  Page count degraded: {}", stats.probes_degraded);
    println!();

    println!("Pages:");
    println!("  Attempted: {}", stats.pages_attempted);
    println!("  Failed: {}", stats.pages_failed);
    println!();

    println!("Items:");
    println!("  Excluded by status: {}", stats.items_excluded);
    println!("  Skipped (no link): {}", stats.items_malformed);
    println!("  Links collected: {}", stats.links_collected);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        stats.page_success_rate(),
        stats.pages_attempted - stats.pages_failed,
        stats.pages_attempted
    );
}
