//! Bounded concurrent page crawler
//!
//! Pages `1..=last_page` of one category are fetched by at most
//! `max-workers` concurrent jobs. Each job yields the parsed page or a
//! [`PageFetchError`]; the crawl loop is the only writer of the aggregate
//! and folds outcomes in completion order. A failed page contributes
//! nothing and never cancels its siblings.

use crate::config::Config;
use crate::crawler::fetcher::{listing_query, Fetcher};
use crate::crawler::parser::{parse_listing, ListingPage};
use crate::TransportError;
use futures::{stream, StreamExt};
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

/// Failure of a single listing page
#[derive(Debug, Error)]
#[error("page {page} of category {category_id} failed: {source}")]
pub struct PageFetchError {
    pub category_id: i64,
    pub page: u32,
    #[source]
    pub source: TransportError,
}

/// Aggregate of all pages crawled for one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCrawl {
    /// Deduplicated accepted URLs
    pub links: BTreeSet<String>,

    pub pages_attempted: u32,
    pub pages_failed: u32,

    /// Rows dropped by the status filter
    pub excluded: usize,

    /// Rows dropped for lack of a link
    pub malformed: usize,
}

impl PageCrawl {
    /// Folds one page outcome into the aggregate
    ///
    /// Union and counters are commutative, so the result does not depend on
    /// the order pages complete in.
    pub fn merge_page(&mut self, outcome: Result<ListingPage, PageFetchError>) {
        self.pages_attempted += 1;
        match outcome {
            Ok(page) => {
                self.excluded += page.excluded;
                self.malformed += page.malformed;
                self.links.extend(page.items.into_iter().map(|item| item.url));
            }
            Err(_) => self.pages_failed += 1,
        }
    }
}

/// Fetches and parses one listing page
pub async fn fetch_page(
    fetcher: &Fetcher,
    config: &Config,
    base_url: &Url,
    category_id: i64,
    page: u32,
) -> Result<ListingPage, PageFetchError> {
    let query = listing_query(category_id, config.site.agency_id, page);
    let body = fetcher
        .fetch(&config.site.listing_url, &query, config.crawler.page_timeout())
        .await
        .map_err(|source| PageFetchError {
            category_id,
            page,
            source,
        })?;

    Ok(parse_listing(
        &body,
        base_url,
        &config.filter.excluded_statuses,
    ))
}

/// Crawls every page of a category with a bounded number of workers
///
/// # Arguments
///
/// * `fetcher` - Shared HTTP adapter, borrowed by every job
/// * `config` - The inventory configuration
/// * `base_url` - Base for resolving relative document links
/// * `category_id` - Category to crawl
/// * `last_page` - Number of pages to fetch, starting at page 1
pub async fn crawl_pages(
    fetcher: &Fetcher,
    config: &Config,
    base_url: &Url,
    category_id: i64,
    last_page: u32,
) -> PageCrawl {
    let workers = config.crawler.max_workers.max(1);
    let mut outcomes = stream::iter(1..=last_page)
        .map(|page| fetch_page(fetcher, config, base_url, category_id, page))
        .buffer_unordered(workers);

    let mut crawl = PageCrawl::default();
    while let Some(outcome) = outcomes.next().await {
        if let Err(e) = &outcome {
            tracing::warn!("Failed to crawl {}", e);
        }
        crawl.merge_page(outcome);
        tracing::debug!(
            "Category {}: {}/{} pages done",
            category_id,
            crawl.pages_attempted,
            last_page
        );
    }

    crawl
}
