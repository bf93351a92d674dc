//! HTTP client adapter
//!
//! Every request of a run goes through one [`Fetcher`], which wraps a single
//! `reqwest::Client` and therefore a single connection pool. The fetcher:
//! - sends the shared browser user agent with every request
//! - bounds each call with a timeout
//! - turns timeouts, connection failures and non-2xx statuses into
//!   [`TransportError`]s
//!
//! Retries are left to callers.

use crate::config::Config;
use crate::TransportError;
use reqwest::Client;
use std::time::Duration;

/// Query parameter carrying the category id
pub const CATEGORY_PARAM: &str = "idLoaiVanBan";

/// Query parameter carrying the issuing agency id
pub const AGENCY_PARAM: &str = "dvid";

/// Query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "Page";

/// Builds an HTTP client with the configured headers
///
/// # Arguments
///
/// * `config` - The inventory configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use vbpl_inventory::config::Config;
/// use vbpl_inventory::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.http.user_agent.clone())
        .timeout(config.crawler.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the query string of one listing page
pub fn listing_query(category_id: i64, agency_id: u32, page: u32) -> Vec<(&'static str, String)> {
    vec![
        (CATEGORY_PARAM, category_id.to_string()),
        (AGENCY_PARAM, agency_id.to_string()),
        (PAGE_PARAM, page.to_string()),
    ]
}

/// Shared handle for issuing GET requests
///
/// Cloning is cheap and clones share the connection pool. Page jobs borrow
/// the orchestrator's fetcher instead of owning one.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Fetches `url` with the given query parameters and returns the body
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Timeout elapsed | `Timeout` |
    /// | Connection refused / DNS / TLS | `Connect` |
    /// | Non-2xx status | `Status` |
    /// | Body could not be read | `Body` |
    /// | Anything else | `Http` |
    pub async fn fetch(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let request = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .build()
            .map_err(|source| TransportError::Http {
                url: url.to_string(),
                source,
            })?;
        let target = request.url().to_string();

        tracing::trace!("GET {}", target);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| classify_error(&target, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: target,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| {
            if source.is_timeout() {
                TransportError::Timeout { url: target.clone() }
            } else {
                TransportError::Body {
                    url: target.clone(),
                    source,
                }
            }
        })
    }
}

/// Maps a `reqwest` send error onto the transport taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    let url = url.to_string();
    if error.is_timeout() {
        TransportError::Timeout { url }
    } else if error.is_connect() {
        TransportError::Connect { url, source: error }
    } else {
        TransportError::Http { url, source: error }
    }
}
