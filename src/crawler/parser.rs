//! HTML parsing for the landing page and listing pages
//!
//! This module extracts:
//! - the category list (`ul#loaiVB li a`) from the landing page
//! - document rows (`ul.listLaw > li`) and their status labels from a
//!   listing page
//! - the "N văn bản" total-count label shown above the listing

use crate::crawler::fetcher::CATEGORY_PARAM;
use crate::crawler::types::{Category, ListingItem};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const CATEGORY_LIST: &str = "ul#loaiVB";
const CATEGORY_LINK: &str = "li a";
const LISTING_ROW: &str = "ul.listLaw > li";
const ROW_STATUS: &str = "div.right p.red";
const ROW_TITLE_LINK: &str = "p.title > a";
const COUNT_LABEL: &str = "div.box-tab div.header ul li a.selected span";

/// Everything extracted from one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Rows that passed the status filter and carried a link
    pub items: Vec<ListingItem>,

    /// Number of rows rendered, accepted or not
    pub rows: usize,

    /// Rows dropped because of an excluded status
    pub excluded: usize,

    /// Rows dropped because they had no usable link
    pub malformed: usize,

    /// Text of the total-count label, if present
    pub count_label: Option<String>,
}

/// Parses a listing page
///
/// A row whose status label contains any of `excluded_statuses` is dropped
/// before its link is read. A row without a title link is skipped. Relative
/// links are resolved against `base_url`.
///
/// # Example
///
/// ```
/// use vbpl_inventory::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<ul class="listLaw"><li><p class="title"><a href="/doc?ItemID=1">Doc</a></p></li></ul>"#;
/// let base = Url::parse("https://vbpl.vn").unwrap();
/// let page = parse_listing(html, &base, &[]);
/// assert_eq!(page.items[0].url, "https://vbpl.vn/doc?ItemID=1");
/// ```
pub fn parse_listing(html: &str, base_url: &Url, excluded_statuses: &[String]) -> ListingPage {
    let document = Html::parse_document(html);
    let mut page = ListingPage {
        count_label: extract_count_label(&document),
        ..ListingPage::default()
    };

    let (Ok(row_selector), Ok(status_selector), Ok(link_selector)) = (
        Selector::parse(LISTING_ROW),
        Selector::parse(ROW_STATUS),
        Selector::parse(ROW_TITLE_LINK),
    ) else {
        return page;
    };

    for row in document.select(&row_selector) {
        page.rows += 1;

        let status_label = row
            .select(&status_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if is_excluded(&status_label, excluded_statuses) {
            page.excluded += 1;
            continue;
        }

        let url = row
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| resolve_link(href, base_url));

        match url {
            Some(url) => page.items.push(ListingItem { url, status_label }),
            None => page.malformed += 1,
        }
    }

    page
}

/// Extracts the category list from the landing page
///
/// Returns `None` when the category container is missing. Entries without a
/// name, an href or a numeric category id are dropped.
pub fn parse_categories(html: &str, base_url: &Url) -> Option<Vec<Category>> {
    let document = Html::parse_document(html);
    let container_selector = Selector::parse(CATEGORY_LIST).ok()?;
    let link_selector = Selector::parse(CATEGORY_LINK).ok()?;

    let container = document.select(&container_selector).next()?;

    let categories = container
        .select(&link_selector)
        .filter_map(|link| {
            let name = element_text(link);
            let href = link.value().attr("href")?;
            if name.is_empty() {
                return None;
            }
            let id = category_id_from_href(href, base_url)?;
            Some(Category { id, name })
        })
        .collect();

    Some(categories)
}

/// Reads the category id from a category link's query string
fn category_id_from_href(href: &str, base_url: &Url) -> Option<i64> {
    let url = base_url.join(href.trim()).ok()?;
    let (_, value) = url.query_pairs().find(|(key, _)| key == CATEGORY_PARAM)?;
    value.trim().parse().ok()
}

/// Returns the text of the total-count label
fn extract_count_label(document: &Html) -> Option<String> {
    let selector = Selector::parse(COUNT_LABEL).ok()?;
    document.select(&selector).next().map(element_text)
}

/// Whether a status label matches one of the excluded labels
pub fn is_excluded(status_label: &str, excluded_statuses: &[String]) -> bool {
    excluded_statuses
        .iter()
        .any(|excluded| status_label.contains(excluded.as_str()))
}

/// Collects and trims the text of an element
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves a document href to an absolute http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
