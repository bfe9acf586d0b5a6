use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `AUDIORIP_CONVERTER__FFMPEG_PATH`.
pub const ENV_PREFIX: &str = "AUDIORIP_";

fn env_overrides() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(env_overrides())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load built-in defaults with environment variable overrides
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(env_overrides())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_empty() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.converter.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.batch.max_concurrent, 0);
    }

    #[test]
    fn test_load_config_from_str_partial() {
        let toml = r#"
[converter]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"

[batch]
max_concurrent = 4
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(
            config.converter.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert_eq!(config.converter.check_timeout_secs, 10);
        assert_eq!(config.batch.max_concurrent, 4);
        assert_eq!(config.session.status_poll_interval_ms, 100);
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[batch]
max_concurrent = "lots"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/audiorip.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[converter]
check_timeout_secs = 3

[session]
status_poll_interval_ms = 250
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.converter.check_timeout_secs, 3);
        assert_eq!(config.session.status_poll_interval_ms, 250);
        assert_eq!(config.batch.failure_detail_limit, 5);
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "audiorip.toml",
                r#"
[converter]
ffmpeg_path = "/usr/bin/ffmpeg"
"#,
            )?;
            jail.set_env("AUDIORIP_CONVERTER__FFMPEG_PATH", "/custom/ffmpeg");
            jail.set_env("AUDIORIP_BATCH__MAX_CONCURRENT", "3");

            let config = load_config(Path::new("audiorip.toml")).unwrap();
            assert_eq!(config.converter.ffmpeg_path, PathBuf::from("/custom/ffmpeg"));
            assert_eq!(config.batch.max_concurrent, 3);

            let from_env = load_config_from_env().unwrap();
            assert_eq!(from_env.converter.ffmpeg_path, PathBuf::from("/custom/ffmpeg"));
            Ok(())
        });
    }
}
