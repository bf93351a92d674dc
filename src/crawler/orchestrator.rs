//! Pipeline orchestrator
//!
//! Runs the enumerate → probe → crawl sequence. Categories are handled one at
//! a time so the page crawler's worker pool is the only source of concurrent
//! requests. Every enumerated category yields exactly one result, in
//! enumeration order, whatever happens to its probe or pages.

use crate::config::Config;
use crate::crawler::categories::enumerate_categories;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::pages::crawl_pages;
use crate::crawler::prober::probe;
use crate::crawler::types::{Category, CategoryResult};
use crate::output::RunStatistics;
use crate::InventoryError;
use chrono::Utc;
use url::Url;

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One entry per enumerated category, in enumeration order
    pub results: Vec<CategoryResult>,

    pub statistics: RunStatistics,
}

/// Sequences the crawl stages over all categories
pub struct Orchestrator {
    config: Config,
    fetcher: Fetcher,
    base_url: Url,
    config_hash: Option<String>,
}

impl Orchestrator {
    /// Creates an orchestrator with an HTTP client built from `config`
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(InventoryError)` - The client could not be built or the base
    ///   URL is invalid
    pub fn new(config: Config) -> Result<Self, InventoryError> {
        let fetcher = Fetcher::from_config(&config)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Creates an orchestrator around an existing fetcher
    pub fn with_fetcher(config: Config, fetcher: Fetcher) -> Result<Self, InventoryError> {
        let base_url = Url::parse(&config.site.base_url)?;
        Ok(Self {
            config,
            fetcher,
            base_url,
            config_hash: None,
        })
    }

    /// Records the hash of the configuration file in the run statistics
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lists the categories of the landing page
    ///
    /// Failure is logged at error level and returned.
    pub async fn enumerate(&self) -> Result<Vec<Category>, InventoryError> {
        enumerate_categories(&self.fetcher, &self.config, &self.base_url)
            .await
            .inspect_err(|e| tracing::error!("{}", e))
    }

    /// Runs the whole pipeline
    ///
    /// Only enumeration failure aborts the run. Degraded probes and failed
    /// pages shrink a category's result but never remove it.
    pub async fn run(&self) -> Result<RunReport, InventoryError> {
        let mut statistics = RunStatistics {
            started_at: Some(Utc::now()),
            config_hash: self.config_hash.clone(),
            ..RunStatistics::default()
        };

        let categories = self.enumerate().await?;

        let mut results = Vec::with_capacity(categories.len());
        for category in &categories {
            let result = self.process_category(category, &mut statistics).await;
            statistics.categories_processed += 1;
            statistics.links_collected += result.links.len();
            results.push(result);
        }

        statistics.finished_at = Some(Utc::now());
        tracing::info!(
            "Run complete: {} categories, {} links, {}/{} pages failed",
            statistics.categories_processed,
            statistics.links_collected,
            statistics.pages_failed,
            statistics.pages_attempted
        );

        Ok(RunReport {
            results,
            statistics,
        })
    }

    /// Probes and crawls one category
    async fn process_category(
        &self,
        category: &Category,
        statistics: &mut RunStatistics,
    ) -> CategoryResult {
        tracing::info!("Processing: {} (ID: {})", category.name, category.id);

        let outcome = probe(&self.fetcher, &self.config, &self.base_url, category.id).await;
        if outcome.degraded {
            statistics.probes_degraded += 1;
        }
        let metadata = outcome.metadata;

        if metadata.is_empty() {
            statistics.categories_empty += 1;
            tracing::info!("No documents found for '{}', skipping", category.name);
            return CategoryResult::empty(&category.name);
        }

        tracing::info!(
            "Found {} pages for '{}', crawling with {} workers",
            metadata.last_page,
            category.name,
            self.config.crawler.max_workers
        );

        let crawl = crawl_pages(
            &self.fetcher,
            &self.config,
            &self.base_url,
            category.id,
            metadata.last_page,
        )
        .await;
        statistics.record_crawl(&crawl);

        tracing::info!(
            "Completed '{}', found {} valid links",
            category.name,
            crawl.links.len()
        );

        CategoryResult::new(&category.name, crawl.links)
    }
}
