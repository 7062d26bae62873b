use crate::config::types::{Config, HttpConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_selection_config(config)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates the request ceiling and selection preferences
fn validate_selection_config(config: &Config) -> Result<(), ConfigError> {
    if config.max_concurrent_requests == 0 {
        return Err(ConfigError::Validation(
            "max_concurrent_requests must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > 20 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 20, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_candidates_per_domain == 0 {
        return Err(ConfigError::Validation(
            "max_candidates_per_domain must be >= 1".to_string(),
        ));
    }

    Ok(())
}
