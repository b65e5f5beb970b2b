use crate::config::types::{Config, CrawlerConfig, FetchConfig, RetryConfig};
use crate::ConfigError;

/// Upper bound on simultaneous downloads
pub const MAX_CONCURRENCY: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_retry_config(&config.retry)?;
    Ok(())
}

/// Validates crawler configuration
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.max_concurrency
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.listing_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "listing_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.download_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "download_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    // 2^(attempts - 2) multiplier on the base delay must stay sane
    if config.max_attempts > 16 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be <= 16, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        let mut config = CrawlerConfig::default();
        config.max_concurrency = 1;
        assert!(validate_crawler_config(&config).is_ok());
        config.max_concurrency = MAX_CONCURRENCY;
        assert!(validate_crawler_config(&config).is_ok());

        config.max_concurrency = 0;
        assert!(validate_crawler_config(&config).is_err());
        config.max_concurrency = MAX_CONCURRENCY + 1;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_validate_fetch_config() {
        let mut config = FetchConfig::default();
        assert!(validate_fetch_config(&config).is_ok());

        config.listing_timeout_secs = 0;
        assert!(validate_fetch_config(&config).is_err());

        let mut config = FetchConfig::default();
        config.download_timeout_secs = 0;
        assert!(validate_fetch_config(&config).is_err());

        let mut config = FetchConfig::default();
        config.user_agent = "   ".to_string();
        assert!(validate_fetch_config(&config).is_err());
    }

    #[test]
    fn test_validate_retry_config() {
        let mut config = RetryConfig::default();
        assert!(validate_retry_config(&config).is_ok());

        config.max_attempts = 0;
        assert!(validate_retry_config(&config).is_err());
        config.max_attempts = 17;
        assert!(validate_retry_config(&config).is_err());
    }
}
