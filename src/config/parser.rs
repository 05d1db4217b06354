//! Configuration file parsing (HOCON format).

use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
#[allow(dead_code)]
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = load_config_str(
            r#"
            relay { listen = "0.0.0.0:7788" }
            discord {
                token = "abc123"
                datetime_on_message = true
                channels { S1 = 123456789, S2 = 987654321 }
            }
            translate {
                enabled = true
                url = "http://localhost:5000"
                api_key = "secret"
                languages = "zh-Hant en"
            }
            instance {
                name = "S1"
                controller = "127.0.0.1:7788"
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.relay.unwrap().listen, "0.0.0.0:7788");
        assert_eq!(config.discord.token, "abc123");
        assert_eq!(config.discord.channels["S1"], 123456789);
        assert_eq!(config.discord.channels["S2"], 987654321);
        let translate = config.translate.unwrap();
        assert!(translate.is_enabled());
        assert_eq!(translate.target_languages(), vec!["zh-Hant", "en"]);
        assert_eq!(config.instance.unwrap().name, "S1");
    }

    #[test]
    fn test_optional_sections_absent() {
        let config = load_config_str(
            r#"
            relay { listen = "0.0.0.0:7788" }
            discord {
                token = "abc123"
                channels { S1 = 1 }
            }
            "#,
        )
        .unwrap();

        assert!(config.translate.is_none());
        assert!(config.instance.is_none());
        assert!(config.runs_controller());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/nonexistent/crier.conf");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
