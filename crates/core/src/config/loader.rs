use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix. Nested keys use `__`, e.g.
/// `VIDNORM_TARGETS__MAX_HEIGHT=480`.
pub const ENV_PREFIX: &str = "VIDNORM_";

/// Load configuration from defaults, an optional TOML file and environment
/// variable overrides, in that order.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
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
    use figment::Jail;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[targets]
target_video_bitrate_kbps = 500
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.targets.target_video_bitrate_kbps, 500);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[targets]
max_height = "tall"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Some(Path::new("/nonexistent/vidnorm.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        Jail::expect_with(|_jail| {
            let mut temp_file = NamedTempFile::new().unwrap();
            writeln!(
                temp_file,
                r#"
[probe]
ffprobe_path = "/usr/local/bin/ffprobe"

[batch]
extension = "mkv"
"#
            )
            .unwrap();

            let config = load_config(Some(temp_file.path())).unwrap();
            assert_eq!(config.batch.extension, "mkv");
            assert_eq!(
                config.probe.ffprobe_path.to_string_lossy(),
                "/usr/local/bin/ffprobe"
            );
            assert_eq!(config.targets.max_height, 720);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "vidnorm.toml",
                r#"
[targets]
max_height = 480
max_width = 854
"#,
            )?;
            jail.set_env("VIDNORM_TARGETS__MAX_HEIGHT", "360");
            jail.set_env("VIDNORM_BATCH__WORKERS", "2");

            let config = load_config(Some(Path::new("vidnorm.toml")))
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.targets.max_height, 360);
            assert_eq!(config.targets.max_width, 854);
            assert_eq!(config.batch.workers, Some(2));
            Ok(())
        });
    }

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config =
                load_config(None).map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }
}
