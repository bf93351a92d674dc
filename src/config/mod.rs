//! Configuration module
//!
//! Loads, parses and validates the TOML configuration. Every key has a
//! default, so an empty file (or no file at all) yields a runnable setup.
//!
//! # Example
//!
//! ```no_run
//! use vbpl_inventory::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("inventory.toml")).unwrap();
//! println!("Crawling with {} workers", config.crawler.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FilterConfig, HttpConfig, OutputConfig, SiteConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
