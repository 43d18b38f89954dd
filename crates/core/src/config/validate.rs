use super::{types::Config, ConfigError};

/// Longest accepted `ingest.interval_minutes` (30 days).
pub const MAX_INTERVAL_MINUTES: u64 = 30 * 24 * 60;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Ingest timeouts and intervals are not 0
/// - The ingest interval is at most [`MAX_INTERVAL_MINUTES`]
/// - Seeded sources have a label and an http(s) URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.ingest.fetch_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "ingest.fetch_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.ingest.interval_minutes == Some(0) {
        return Err(ConfigError::ValidationError(
            "ingest.interval_minutes cannot be 0".to_string(),
        ));
    }

    if let Some(minutes) = config.ingest.interval_minutes {
        if minutes > MAX_INTERVAL_MINUTES {
            return Err(ConfigError::ValidationError(format!(
                "ingest.interval_minutes cannot exceed {}, got {}",
                MAX_INTERVAL_MINUTES, minutes
            )));
        }
    }

    for (i, source) in config.sources.iter().enumerate() {
        if source.label.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "sources[{}].label cannot be empty",
                i
            )));
        }
        if !(source.url.starts_with("http://") || source.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "sources[{}].url must be an http(s) URL, got {:?}",
                i, source.url
            )));
        }
    }

    Ok(())
}
