//! vbpl-inventory: a link inventory builder for paginated legal-document listings
//!
//! This crate enumerates the document-type categories of a listing site, probes
//! each category for its page count, crawls every listing page with a bounded
//! worker pool and produces a deduplicated per-category link inventory.

pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for inventory runs
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Could not enumerate document categories: {0}")]
    Enumeration(String),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure of a single GET request
///
/// Raised on timeout, connection failure, non-2xx status or an unreadable
/// body. Never retried by the adapter.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Result type alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Category, CategoryResult, Orchestrator, PageMetadata, RunReport};
pub use output::RunStatistics;
