use serde::Deserialize;
use std::time::Duration;

/// Browser user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/108.0.0.0 Safari/537.36";

/// Main configuration structure
///
/// Every section is optional; missing keys fall back to the values the
/// vbpl.vn listing site needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Listing site endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL that relative document links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Page carrying the category list
    #[serde(rename = "landing-url")]
    pub landing_url: String,

    /// Paginated listing endpoint queried per category
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Issuing agency filter sent as the `dvid` query parameter
    #[serde(rename = "agency-id")]
    pub agency_id: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vbpl.vn".to_string(),
            landing_url: "https://vbpl.vn/TW/Pages/vanban.aspx".to_string(),
            listing_url: "https://vbpl.vn/TW/Pages/vanban.aspx".to_string(),
            agency_id: 13,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Width of the per-category worker pool
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Timeout for the landing page and probe requests (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Timeout for listing page requests (seconds)
    #[serde(rename = "page-timeout")]
    pub page_timeout: u64,

    /// Density reported when a category cannot be probed precisely
    #[serde(rename = "default-items-per-page")]
    pub default_items_per_page: u32,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            request_timeout: 30,
            page_timeout: 45,
            default_items_per_page: 15,
        }
    }
}

/// Shared request headers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Lifecycle status filter
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Rows whose status label contains one of these are dropped
    #[serde(rename = "excluded-statuses")]
    pub excluded_statuses: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_statuses: vec![
                "Hết hiệu lực toàn bộ".to_string(),
                "Chưa có hiệu lực".to_string(),
            ],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON link inventory
    #[serde(rename = "inventory-path")]
    pub inventory_path: String,

    /// Path of the failure log
    #[serde(rename = "failure-log-path")]
    pub failure_log_path: String,

    /// Optional path for the flattened detail-fetch task list
    #[serde(rename = "tasks-path")]
    pub tasks_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            inventory_path: "data/raw/law_links.json".to_string(),
            failure_log_path: "logs/failed_links.log".to_string(),
            tasks_path: None,
        }
    }
}
