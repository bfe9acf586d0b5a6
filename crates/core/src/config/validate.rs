use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - converter.ffmpeg_path is not empty
/// - converter.check_timeout_secs is not 0
/// - session.status_poll_interval_ms is not 0
///
/// `batch.max_concurrent = 0` is valid and means unlimited.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.converter.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "converter.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.converter.check_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "converter.check_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.session.status_poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "session.status_poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}
