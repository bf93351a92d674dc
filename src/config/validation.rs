use crate::config::types::{Config, CrawlerConfig, FilterConfig, HttpConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_filter_config(&config.filter)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates site endpoints
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("base_url", &config.base_url)?;
    validate_http_url("landing_url", &config.landing_url)?;
    validate_http_url("listing_url", &config.listing_url)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 64, got {}",
            config.max_workers
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1s".to_string(),
        ));
    }

    if config.page_timeout < 1 {
        return Err(ConfigError::Validation(
            "page_timeout must be >= 1s".to_string(),
        ));
    }

    if config.default_items_per_page < 1 {
        return Err(ConfigError::Validation(
            "default_items_per_page must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    // A blank label would be contained in every status and drop every row
    if config.excluded_statuses.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "excluded_statuses cannot contain blank labels".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.inventory_path.is_empty() {
        return Err(ConfigError::Validation(
            "inventory_path cannot be empty".to_string(),
        ));
    }

    if config.failure_log_path.is_empty() {
        return Err(ConfigError::Validation(
            "failure_log_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.tasks_path, Some(p) if p.is_empty()) {
        return Err(ConfigError::Validation(
            "tasks_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a URL parses and uses an HTTP(S) scheme
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
