use crate::config::types::{Config, FetchConfig, OutputConfig, RangeConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on parallel workers
const MAX_CONCURRENCY: u32 = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_range_config(&config.range)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the identifier range
fn validate_range_config(config: &RangeConfig) -> Result<(), ConfigError> {
    if config.start > config.end {
        return Err(ConfigError::Validation(format!(
            "range start must be <= end, got start={} end={}",
            config.start, config.end
        )));
    }

    if config.end == u64::MAX {
        return Err(ConfigError::Validation(format!(
            "range end must be below {}",
            u64::MAX
        )));
    }

    Ok(())
}

/// Validates request behavior configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if !config.timeout_secs.is_finite() || config.timeout_secs <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be > 0, got {}",
            config.timeout_secs
        )));
    }

    if !config.delay_secs.is_finite() || config.delay_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay-secs must be >= 0, got {}",
            config.delay_secs
        )));
    }

    if !config.grace_period_secs.is_finite() || config.grace_period_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "grace-period-secs must be >= 0, got {}",
            config.grace_period_secs
        )));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.summary_file.is_empty() {
        return Err(ConfigError::Validation(
            "summary-file cannot be empty".to_string(),
        ));
    }

    if config.database_file.is_empty() {
        return Err(ConfigError::Validation(
            "database-file cannot be empty".to_string(),
        ));
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
    fn test_validate_range() {
        assert!(validate_range_config(&RangeConfig { start: 1, end: 1 }).is_ok());
        assert!(validate_range_config(&RangeConfig { start: 0, end: 10 }).is_ok());

        assert!(validate_range_config(&RangeConfig { start: 2, end: 1 }).is_err());
        assert!(validate_range_config(&RangeConfig {
            start: 0,
            end: u64::MAX
        })
        .is_err());
    }

    #[test]
    fn test_validate_base_url() {
        let mut fetch = FetchConfig::default();
        fetch.base_url = "https://example.com/records".to_string();
        assert!(validate_fetch_config(&fetch).is_ok());

        fetch.base_url = "not a url".to_string();
        assert!(matches!(
            validate_fetch_config(&fetch),
            Err(ConfigError::InvalidUrl(_))
        ));

        fetch.base_url = "ftp://example.com/records".to_string();
        assert!(matches!(
            validate_fetch_config(&fetch),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_validate_timing() {
        let mut fetch = FetchConfig::default();
        fetch.delay_secs = 0.0;
        assert!(validate_fetch_config(&fetch).is_ok());

        fetch.delay_secs = -0.5;
        assert!(validate_fetch_config(&fetch).is_err());

        fetch.delay_secs = 0.1;
        fetch.timeout_secs = 0.0;
        assert!(validate_fetch_config(&fetch).is_err());

        fetch.timeout_secs = f64::NAN;
        assert!(validate_fetch_config(&fetch).is_err());
    }

    #[test]
    fn test_validate_concurrency() {
        let mut fetch = FetchConfig::default();
        fetch.concurrency = 0;
        assert!(validate_fetch_config(&fetch).is_err());

        fetch.concurrency = MAX_CONCURRENCY + 1;
        assert!(validate_fetch_config(&fetch).is_err());

        fetch.concurrency = 1;
        assert!(validate_fetch_config(&fetch).is_ok());
    }

    #[test]
    fn test_validate_output() {
        let mut output = OutputConfig::default();
        assert!(validate_output_config(&output).is_ok());

        output.directory = String::new();
        assert!(validate_output_config(&output).is_err());
    }
}
