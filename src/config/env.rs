//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `CRIER_DISCORD_TOKEN` - Discord bot token
//! - `CRIER_TRANSLATE_URL` - Translation service base URL
//! - `CRIER_TRANSLATE_KEY` - Translation service API key
//! - `CRIER_INSTANCE_NAME` - Name the instance agent reports
//! - `CRIER_CONFIG` - Path to the config file

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "CRIER";

/// Apply environment variable overrides to a config.
///
/// This allows sensitive values like tokens and API keys to be provided via
/// environment variables instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }

    if let Some(ref mut translate) = config.translate {
        if let Ok(url) = env::var(format!("{}_TRANSLATE_URL", ENV_PREFIX)) {
            translate.url = url;
        }
        if let Ok(key) = env::var(format!("{}_TRANSLATE_KEY", ENV_PREFIX)) {
            translate.api_key = key;
        }
    }

    if let Some(ref mut instance) = config.instance {
        if let Ok(name) = env::var(format!("{}_INSTANCE_NAME", ENV_PREFIX)) {
            instance.name = name;
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `CRIER_CONFIG`, otherwise returns "crier.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "crier.conf".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::types::*;

    fn make_test_config() -> Config {
        Config {
            relay: None,
            discord: DiscordConfig {
                token: "original_token".to_string(),
                datetime_on_message: None,
                channels: HashMap::new(),
            },
            translate: None,
            instance: None,
        }
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "CRIER");
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        env::remove_var("CRIER_DISCORD_TOKEN");

        let config = make_test_config();
        let result = apply_env_overrides(config);

        assert_eq!(result.discord.token, "original_token");
    }
}
