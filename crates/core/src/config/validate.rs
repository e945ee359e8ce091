use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one lookup attempt is allowed
/// - Chain overrides do not carry an empty endpoint
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.enrichment.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "enrichment.retry.max_attempts must be at least 1".to_string(),
        ));
    }

    for (key, chain) in &config.chains {
        if key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chain origin keys cannot be empty".to_string(),
            ));
        }
        if matches!(chain.endpoint.as_deref(), Some(e) if e.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "chains.{}.endpoint cannot be empty",
                key
            )));
        }
    }

    Ok(())
}
