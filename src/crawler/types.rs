//! Data types shared by the crawl stages

use serde::Serialize;
use std::collections::BTreeSet;

/// A document-type category exposed by the landing page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    /// Value of the `idLoaiVanBan` query parameter
    pub id: i64,

    /// Display name shown in the category list
    pub name: String,
}

/// Page count derived from the first listing page of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetadata {
    /// Number of the last listing page; 0 means the category is empty
    pub last_page: u32,

    /// Rows rendered on a full page
    pub items_per_page: u32,
}

impl PageMetadata {
    /// Metadata for a category with no documents
    pub fn empty(default_items_per_page: u32) -> Self {
        Self {
            last_page: 0,
            items_per_page: default_items_per_page,
        }
    }

    /// Single-page metadata used when the count cannot be determined
    pub fn fallback(default_items_per_page: u32) -> Self {
        Self {
            last_page: 1,
            items_per_page: default_items_per_page,
        }
    }

    /// Whether the category has no documents to crawl
    pub fn is_empty(&self) -> bool {
        self.last_page == 0
    }
}

/// One accepted row of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Absolute document URL
    pub url: String,

    /// Lifecycle status label, empty when the row has none
    pub status_label: String,
}

/// Inventory entry for one category
///
/// Serializes to `{"loaivanban": <name>, "links": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResult {
    #[serde(rename = "loaivanban")]
    pub category_name: String,

    pub links: BTreeSet<String>,
}

impl CategoryResult {
    pub fn new(category_name: impl Into<String>, links: BTreeSet<String>) -> Self {
        Self {
            category_name: category_name.into(),
            links,
        }
    }

    /// Result for a category that produced no links
    pub fn empty(category_name: impl Into<String>) -> Self {
        Self::new(category_name, BTreeSet::new())
    }
}
