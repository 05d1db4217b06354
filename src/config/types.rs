//! Configuration type definitions.

use std::collections::HashMap;

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub relay: Option<RelayConfig>,
    pub discord: DiscordConfig,
    pub translate: Option<TranslateConfig>,
    pub instance: Option<InstanceConfig>,
}

/// Uplink listener configuration (controller side).
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Address the controller accepts instance uplinks on.
    pub listen: String,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// Prepend a `YYYYMMDD HHMMSS` timestamp to every relayed message.
    pub datetime_on_message: Option<bool>,
    /// Instance name -> Discord channel id.
    pub channels: HashMap<String, u64>,
}

/// LibreTranslate augmentation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateConfig {
    pub enabled: Option<bool>,
    /// Base URL of the translation service, including protocol and port.
    pub url: String,
    pub api_key: String,
    /// Whitespace-separated target language codes, in order.
    pub languages: String,
}

impl TranslateConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    /// The ordered target-language list parsed from the config string.
    pub fn target_languages(&self) -> Vec<String> {
        self.languages
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Instance agent configuration. When present, this process also follows a
/// game server's console output and relays it to `controller`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    /// Name this instance reports itself as; must match a key in
    /// `discord.channels` to be relayed.
    pub name: String,
    /// Address of the controller's uplink listener.
    pub controller: String,
}

impl Config {
    /// True when this process should run the controller side.
    pub fn runs_controller(&self) -> bool {
        self.relay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_languages_split_on_whitespace() {
        let translate = TranslateConfig {
            enabled: Some(true),
            url: "http://localhost:5000".to_string(),
            api_key: "k".to_string(),
            languages: " zh-Hant  en\tfr ".to_string(),
        };

        assert_eq!(translate.target_languages(), vec!["zh-Hant", "en", "fr"]);
    }

    #[test]
    fn test_translate_disabled_by_default() {
        let translate = TranslateConfig {
            enabled: None,
            url: String::new(),
            api_key: String::new(),
            languages: String::new(),
        };

        assert!(!translate.is_enabled());
        assert!(translate.target_languages().is_empty());
    }
}
