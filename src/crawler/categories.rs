//! Category enumerator

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::parse_categories;
use crate::crawler::types::Category;
use crate::InventoryError;
use url::Url;

/// Fetches the landing page and lists its document-type categories
///
/// Categories are returned in page order. An unreachable landing page, a
/// missing category list or a list without any usable entry is an
/// [`InventoryError::Enumeration`]: with no category there is nothing to
/// crawl.
pub async fn enumerate_categories(
    fetcher: &Fetcher,
    config: &Config,
    base_url: &Url,
) -> Result<Vec<Category>, InventoryError> {
    let body = fetcher
        .fetch(&config.site.landing_url, &[], config.crawler.request_timeout())
        .await
        .map_err(|e| InventoryError::Enumeration(e.to_string()))?;

    let categories = parse_categories(&body, base_url).ok_or_else(|| {
        InventoryError::Enumeration(format!(
            "category list not found on {}",
            config.site.landing_url
        ))
    })?;

    if categories.is_empty() {
        return Err(InventoryError::Enumeration(format!(
            "no category with a usable id on {}",
            config.site.landing_url
        )));
    }

    tracing::info!("Extracted {} document types", categories.len());
    Ok(categories)
}
