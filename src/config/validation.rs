use crate::config::types::{Config, CrawlerConfig, UserAgentConfig};
use crate::url::parse_start_url;
use crate::{ConfigError, ConfigResult};

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.start_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "start_url is required".to_string(),
        ));
    }

    parse_start_url(&config.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", config.start_url, e))
    })?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if !config.delay.is_finite() || config.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a finite number of seconds >= 0, got {}",
            config.delay
        )));
    }

    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.fetch_timeout == 0 {
        return Err(ConfigError::Validation(
            "fetch_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.robots_timeout == 0 {
        return Err(ConfigError::Validation(
            "robots_timeout must be >= 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    let value = config.header_value();
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    if config.custom.is_none() && config.crawler_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user agent must not contain control characters, got '{}'",
            value.escape_debug()
        )));
    }

    Ok(())
}
