//! Configuration validation.
//!
//! Structural mistakes (bad addresses, broken channel mapping, nothing to
//! run) are fatal. Missing secrets only warn: the affected feature runs
//! degraded (relay offline, translation disabled) and a config reload can
//! supply the secret later without a restart.

use tracing::warn;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Validate Discord config
    if config.discord.token.is_empty() {
        warn!("discord.token is not set; the relay stays offline until one is configured");
    } else if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        warn!("discord.token is still the placeholder; the relay stays offline");
    }
    if config.runs_controller() && config.discord.channels.is_empty() {
        errors.push("discord.channels is empty - no instance is mapped to a channel".to_string());
    }
    for (name, channel_id) in &config.discord.channels {
        if name.is_empty() {
            errors.push("discord.channels contains an empty instance name".to_string());
        }
        if *channel_id == 0 {
            errors.push(format!(
                "discord.channels.{} must be a non-zero channel id",
                name
            ));
        }
    }

    // Validate relay listener
    if let Some(ref relay) = config.relay {
        if relay.listen.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "relay.listen '{}' is not a valid socket address",
                relay.listen
            ));
        }
    }

    // Validate translation config. Problems here disable the feature, they
    // never stop the relay itself.
    if let Some(ref translate) = config.translate {
        if translate.is_enabled() {
            if reqwest::Url::parse(&translate.url).is_err() {
                warn!(
                    "translate.url '{}' is not a valid URL; translation will be disabled",
                    translate.url
                );
            }
            if translate.api_key.is_empty() {
                warn!("translate.api_key is not set; translation will be disabled");
            }
            if translate.target_languages().is_empty() {
                warn!("translate.languages lists no target language; translation will be disabled");
            }
        }
    }

    // Validate instance agent config
    if let Some(ref instance) = config.instance {
        if instance.name.is_empty() {
            errors.push("instance.name is required".to_string());
        }
        if instance.controller.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "instance.controller '{}' is not a valid socket address",
                instance.controller
            ));
        }
    }

    if config.relay.is_none() && config.instance.is_none() {
        errors.push("neither relay nor instance is configured - nothing to run".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::types::*;

    fn make_valid_config() -> Config {
        let mut channels = HashMap::new();
        channels.insert("S1".to_string(), 987654321);

        Config {
            relay: Some(RelayConfig {
                listen: "0.0.0.0:7788".to_string(),
            }),
            discord: DiscordConfig {
                token: "valid_token_here".to_string(),
                datetime_on_message: Some(true),
                channels,
            },
            translate: Some(TranslateConfig {
                enabled: Some(true),
                url: "http://localhost:5000".to_string(),
                api_key: "123456".to_string(),
                languages: "zh-Hant en".to_string(),
            }),
            instance: Some(InstanceConfig {
                name: "S1".to_string(),
                controller: "127.0.0.1:7788".to_string(),
            }),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let config = make_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    // A missing or placeholder token keeps the relay offline but must not
    // stop the process; the connection coordinator handles the degraded
    // state.
    #[test]
    fn test_empty_token_is_not_fatal() {
        let mut config = make_valid_config();
        config.discord.token = String::new();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_placeholder_token_is_not_fatal() {
        let mut config = make_valid_config();
        config.discord.token = "YOUR_DISCORD_TOKEN_HERE".to_string();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_controller_without_mapping_fails() {
        let mut config = make_valid_config();
        config.discord.channels.clear();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("discord.channels"));
    }

    #[test]
    fn test_zero_channel_id_fails() {
        let mut config = make_valid_config();
        config.discord.channels.insert("S2".to_string(), 0);

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("non-zero"));
    }

    // Broken translation settings only disable translation.
    #[test]
    fn test_invalid_translate_url_is_not_fatal() {
        let mut config = make_valid_config();
        config.translate.as_mut().unwrap().url = "not a url".to_string();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_api_key_is_not_fatal() {
        let mut config = make_valid_config();
        config.translate.as_mut().unwrap().api_key = String::new();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_disabled_translate_skips_checks() {
        let mut config = make_valid_config();
        let translate = config.translate.as_mut().unwrap();
        translate.enabled = Some(false);
        translate.url = "not a url".to_string();
        translate.api_key = String::new();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_languages_is_not_fatal() {
        let mut config = make_valid_config();
        config.translate.as_mut().unwrap().languages = "  ".to_string();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_no_role_configured_fails() {
        let mut config = make_valid_config();
        config.relay = None;
        config.instance = None;

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("nothing to run"));
    }

    #[test]
    fn test_bad_listen_address_fails() {
        let mut config = make_valid_config();
        config.relay = Some(RelayConfig {
            listen: "not-an-addr".to_string(),
        });

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("relay.listen"));
    }
}
