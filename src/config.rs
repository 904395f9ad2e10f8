//! Configuration and settings management
//!
//! Loads settings from config files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from files and environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Comma-separated list of channel handles for the Channels button
    #[serde(rename = "channel_links")]
    pub channel_links_str: Option<String>,

    /// Developer contact handle for the About button
    #[serde(default = "default_developer_contact")]
    pub developer_contact: String,
}

fn default_developer_contact() -> String {
    "@KoxVX".to_string()
}

/// Channels advertised when none are configured
const DEFAULT_CHANNELS: &[&str] = &["@l27_0", "@Pv_vX", "@Ye_vX"];

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Also add settings from environment variables directly (without prefix)
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }

    /// Returns the channel handles to advertise, falling back to the
    /// built-in defaults when none are configured
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        self.channel_links_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .filter(|parsed: &Vec<String>| !parsed.is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNELS.iter().map(|&c| c.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_settings() -> Settings {
        Settings {
            telegram_token: "dummy".to_string(),
            channel_links_str: None,
            developer_contact: default_developer_contact(),
        }
    }

    #[test]
    fn test_channel_list_parsing() {
        let mut settings = bare_settings();

        // Test comma
        settings.channel_links_str = Some("@one,@two".to_string());
        assert_eq!(settings.channels(), vec!["@one", "@two"]);

        // Test semicolon and mixed separators
        settings.channel_links_str = Some("@a; @b, @c".to_string());
        assert_eq!(settings.channels(), vec!["@a", "@b", "@c"]);

        // Unset falls back to defaults
        settings.channel_links_str = None;
        assert_eq!(settings.channels(), DEFAULT_CHANNELS.to_vec());

        // Empty string also falls back
        settings.channel_links_str = Some("  ".to_string());
        assert_eq!(settings.channels(), DEFAULT_CHANNELS.to_vec());
    }
}
