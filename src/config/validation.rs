use crate::config::types::{
    Config, DedupConfig, FetchConfig, IdentityConfig, OutputConfig, PipelineConfig,
    ValidationConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_identity_config(&config.identity)?;
    validate_validation_config(&config.validation)?;
    validate_dedup_config(&config.dedup)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.requests_per_minute < 1 || config.requests_per_minute > 600 {
        return Err(ConfigError::Validation(format!(
            "requests_per_minute must be between 1 and 600, got {}",
            config.requests_per_minute
        )));
    }

    if config.jitter_min_ms > config.jitter_max_ms {
        return Err(ConfigError::Validation(format!(
            "jitter_min_ms ({}) must not exceed jitter_max_ms ({})",
            config.jitter_min_ms, config.jitter_max_ms
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates identity pool configuration
fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "identity.user_agents must contain at least one entry".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "identity.user_agents entries cannot be empty".to_string(),
        ));
    }

    for proxy in &config.proxies {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy URL '{}': {}", proxy, e)))?;
    }

    Ok(())
}

/// Validates the record validator's range tables
fn validate_validation_config(config: &ValidationConfig) -> Result<(), ConfigError> {
    if config.min_price >= config.max_price {
        return Err(ConfigError::Validation(format!(
            "min_price ({}) must be below max_price ({})",
            config.min_price, config.max_price
        )));
    }

    if config.min_rent >= config.max_rent {
        return Err(ConfigError::Validation(format!(
            "min_rent ({}) must be below max_rent ({})",
            config.min_rent, config.max_rent
        )));
    }

    if config.min_square_feet >= config.max_square_feet {
        return Err(ConfigError::Validation(format!(
            "min_square_feet ({}) must be below max_square_feet ({})",
            config.min_square_feet, config.max_square_feet
        )));
    }

    if config.min_lot_size >= config.max_lot_size {
        return Err(ConfigError::Validation(format!(
            "min_lot_size ({}) must be below max_lot_size ({})",
            config.min_lot_size, config.max_lot_size
        )));
    }

    Ok(())
}

/// Validates dedup weights and threshold
fn validate_dedup_config(config: &DedupConfig) -> Result<(), ConfigError> {
    if config.similarity_threshold <= 0.0 || config.similarity_threshold > 1.0 {
        return Err(ConfigError::Validation(format!(
            "similarity_threshold must be in (0, 1], got {}",
            config.similarity_threshold
        )));
    }

    let weights = [
        config.street_weight,
        config.city_weight,
        config.state_weight,
        config.zip_weight,
        config.bedrooms_weight,
        config.bathrooms_weight,
        config.square_feet_weight,
    ];

    if weights.iter().any(|w| *w < 0.0) {
        return Err(ConfigError::Validation(
            "dedup weights cannot be negative".to_string(),
        ));
    }

    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(ConfigError::Validation(
            "dedup weights must sum to a positive value".to_string(),
        ));
    }

    Ok(())
}

/// Validates pipeline knobs
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.max_error_samples < 1 {
        return Err(ConfigError::Validation(
            "max_error_samples must be >= 1".to_string(),
        ));
    }

    if config.price_thousands_threshold < 0 {
        return Err(ConfigError::Validation(
            "price_thousands_threshold cannot be negative".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_requests_per_minute_rejected() {
        let mut config = Config::default();
        config.fetch.requests_per_minute = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_inverted_jitter_bounds_rejected() {
        let mut config = Config::default();
        config.fetch.jitter_min_ms = 500;
        config.fetch.jitter_max_ms = 100;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_user_agents_rejected() {
        let mut config = Config::default();
        config.identity.user_agents.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_proxy_url_rejected() {
        let mut config = Config::default();
        config.identity.proxies.push("not a url".to_string());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let mut config = Config::default();
        config.dedup.similarity_threshold = 1.5;
        assert!(validate(&config).is_err());

        config.dedup.similarity_threshold = 0.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = Config::default();
        config.dedup.street_weight = 0.0;
        config.dedup.city_weight = 0.0;
        config.dedup.state_weight = 0.0;
        config.dedup.zip_weight = 0.0;
        config.dedup.bedrooms_weight = 0.0;
        config.dedup.bathrooms_weight = 0.0;
        config.dedup.square_feet_weight = 0.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_inverted_price_range_rejected() {
        let mut config = Config::default();
        config.validation.min_price = 200_000_000;
        assert!(validate(&config).is_err());
    }
}
