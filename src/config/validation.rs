use crate::config::types::{
    Config, CrawlerConfig, DiscoveryConfig, OutputConfig, Settings, UserAgentConfig,
};
use crate::ConfigError;

/// Listing counts above this make discovery slow enough to warrant a warning
const HIGH_RESULT_COUNT: u32 = 100;
/// Per-website budgets above these make a run slow enough to warrant a warning
const HIGH_PAGE_BUDGET: u32 = 50;
const HIGH_DEPTH: u32 = 5;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_discovery_config(&config.discovery)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the JSON settings document
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            settings.max_pages
        )));
    }
    Ok(())
}

/// Validates a discovery search query
pub fn validate_query(query: &str) -> Result<(), ConfigError> {
    if query.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search query cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Returns advisory warnings for settings that make a run very slow
///
/// These never fail validation; callers decide whether to surface them.
pub fn high_load_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.discovery.max_results > HIGH_RESULT_COUNT {
        warnings.push(format!(
            "Collecting {} listings may take a long time",
            config.discovery.max_results
        ));
    }

    if config.crawler.max_pages > HIGH_PAGE_BUDGET || config.crawler.max_depth > HIGH_DEPTH {
        warnings.push(format!(
            "Crawling up to {} pages at depth {} per website may take a long time",
            config.crawler.max_pages, config.crawler.max_depth
        ));
    }

    warnings
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.robots_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "robots_timeout_secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the identity pool
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool cannot be empty".to_string(),
        ));
    }

    for agent in &config.pool {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent pool entries cannot be blank".to_string(),
            ));
        }

        // Must be usable as an HTTP header value
        if agent.chars().any(|c| c.is_control()) {
            return Err(ConfigError::Validation(format!(
                "user-agent '{}' contains control characters",
                agent.escape_debug()
            )));
        }
    }

    Ok(())
}

/// Validates discovery configuration
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.max_results < 1 || config.max_results > 200 {
        return Err(ConfigError::Validation(format!(
            "max_results must be between 1 and 200, got {}",
            config.max_results
        )));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    if config.navigation_timeout_ms == 0 || config.step_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "discovery timeouts must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
