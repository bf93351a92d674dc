//! Pagination prober
//!
//! Fetches the first listing page of a category and derives how many pages
//! the category spans from the rendered row count and the "N văn bản" label.

use crate::config::Config;
use crate::crawler::fetcher::{listing_query, Fetcher};
use crate::crawler::parser::parse_listing;
use crate::crawler::types::PageMetadata;
use crate::TransportError;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d.]*)\s*văn bản").unwrap());

/// Reasons a page count could not be determined precisely
///
/// None of these are fatal: the caller falls back to a single page.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("first page could not be fetched: {0}")]
    Fetch(#[from] TransportError),

    #[error("total-count label not found")]
    MissingCountLabel,

    #[error("total-count label is not parsable: {0:?}")]
    UnparsableCount(String),
}

/// Probes a category, reporting why a precise count was not possible
///
/// # Returns
///
/// * `Ok(PageMetadata)` - Exact page count, or `last_page == 0` for an
///   empty category
/// * `Err(ProbeError)` - The count could not be derived
pub async fn try_probe(
    fetcher: &Fetcher,
    config: &Config,
    base_url: &Url,
    category_id: i64,
) -> Result<PageMetadata, ProbeError> {
    let query = listing_query(category_id, config.site.agency_id, 1);
    let body = fetcher
        .fetch(
            &config.site.listing_url,
            &query,
            config.crawler.request_timeout(),
        )
        .await?;

    let page = parse_listing(&body, base_url, &config.filter.excluded_statuses);
    if page.rows == 0 {
        return Ok(PageMetadata::empty(config.crawler.default_items_per_page));
    }

    let label = page.count_label.ok_or(ProbeError::MissingCountLabel)?;
    let total_items = parse_total_items(&label).ok_or(ProbeError::UnparsableCount(label))?;
    let items_per_page = u32::try_from(page.rows).unwrap_or(u32::MAX);

    Ok(PageMetadata {
        last_page: last_page(total_items, items_per_page),
        items_per_page,
    })
}

/// Page count chosen for a category, and whether it is the fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub metadata: PageMetadata,

    /// The count could not be derived and a single page will be crawled
    pub degraded: bool,
}

/// Probes a category, falling back to a single page on any degradation
///
/// Under-crawling a category whose header cannot be read is preferred over
/// aborting the run. The fallback is logged at warning level here; callers
/// only need `degraded` for bookkeeping.
pub async fn probe(
    fetcher: &Fetcher,
    config: &Config,
    base_url: &Url,
    category_id: i64,
) -> ProbeOutcome {
    match try_probe(fetcher, config, base_url, category_id).await {
        Ok(metadata) => ProbeOutcome {
            metadata,
            degraded: false,
        },
        Err(e) => {
            tracing::warn!(
                "Could not determine page count for category {}: {}; crawling a single page",
                category_id,
                e
            );
            ProbeOutcome {
                metadata: PageMetadata::fallback(config.crawler.default_items_per_page),
                degraded: true,
            }
        }
    }
}

/// Extracts the document total from a label such as "Tìm thấy 1.237 văn bản"
///
/// `.` is the thousands separator.
pub fn parse_total_items(label: &str) -> Option<u64> {
    let captures = COUNT_PATTERN.captures(label)?;
    captures[1].replace('.', "").parse().ok()
}

/// Number of pages needed for `total_items` at `items_per_page` per page
pub fn last_page(total_items: u64, items_per_page: u32) -> u32 {
    if items_per_page == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(items_per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
