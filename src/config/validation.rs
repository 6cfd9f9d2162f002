use crate::config::types::{Config, CrawlSection, EngineSection, FiltersSection};
use crate::url::validate_domain_glob;
use crate::ConfigError;
use url::Url;

/// Upper bound of `parallelism`
pub const MAX_PARALLELISM: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_section(&config.crawl)?;
    validate_engine_section(&config.engine)?;
    validate_filters_section(&config.filters)?;
    Ok(())
}

/// Validates site and politeness settings
fn validate_crawl_section(config: &CrawlSection) -> Result<(), ConfigError> {
    let website = Url::parse(&config.website)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid website '{}': {}", config.website, e)))?;

    if website.scheme() != "http" && website.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Website '{}' must use http or https",
            config.website
        )));
    }

    if website.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Website '{}' has no host",
            config.website
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.max_runtime_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "max-runtime-secs must be >= 1, got {}",
            config.max_runtime_secs
        )));
    }

    if config.delay_step_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "delay-step-ms must be >= 1, got {}",
            config.delay_step_ms
        )));
    }

    Ok(())
}

/// Validates fetch engine settings
fn validate_engine_section(config: &EngineSection) -> Result<(), ConfigError> {
    if config.parallelism < 1 || config.parallelism > MAX_PARALLELISM {
        return Err(ConfigError::Validation(format!(
            "parallelism must be between 1 and {}, got {}",
            MAX_PARALLELISM, config.parallelism
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    for pattern in &config.allowed_domains {
        validate_domain_glob(pattern).map_err(ConfigError::InvalidPattern)?;
    }

    Ok(())
}

/// Validates built-in filters
fn validate_filters_section(config: &FiltersSection) -> Result<(), ConfigError> {
    for ext in &config.banned_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "Banned extension '{}' must start with '.' followed by a name",
                ext
            )));
        }
    }

    Ok(())
}
