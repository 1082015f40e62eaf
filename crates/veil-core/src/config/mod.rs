//! Settings configuration.
//!
//! `SettingsConfig` is loaded from an optional JSON file and then overridden
//! by `VEIL_*` environment variables.

mod labels;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::PrivacyKey;
use crate::service::normalize_base_url;
use crate::util::{normalize_text_option, parse_flag};

pub use labels::Labels;

pub const ENV_API_URL: &str = "VEIL_API_URL";
pub const ENV_INSTANT_UNCONFIRMED_TOGGLE: &str = "VEIL_INSTANT_UNCONFIRMED_TOGGLE";
pub const ENV_IDLE_SUPPORTED: &str = "VEIL_IDLE_SUPPORTED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    /// Base URL of the account service.
    pub api_base_url: Option<String>,
    /// Privacy categories shown and reloaded on mount.
    pub privacy_keys: Vec<PrivacyKey>,
    /// Toggle the unconfirmed label and the set/change button without animation.
    pub instant_unconfirmed_toggle: bool,
    /// Whether the platform reports user idle time.
    pub idle_supported: bool,
    pub labels: Labels,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            privacy_keys: PrivacyKey::ALL.to_vec(),
            instant_unconfirmed_toggle: true,
            idle_supported: true,
            labels: Labels::default(),
        }
    }
}

impl SettingsConfig {
    /// Parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validated()
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env(|name| std::env::var(name).ok())
    }

    /// Override fields from `lookup` (normally `std::env::var`).
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = normalize_text_option(lookup(ENV_API_URL)) {
            self.api_base_url = Some(url);
        }
        if let Some(raw) = lookup(ENV_INSTANT_UNCONFIRMED_TOGGLE) {
            self.instant_unconfirmed_toggle = parse_env_flag(ENV_INSTANT_UNCONFIRMED_TOGGLE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_IDLE_SUPPORTED) {
            self.idle_supported = parse_env_flag(ENV_IDLE_SUPPORTED, &raw)?;
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.api_base_url = match normalize_text_option(self.api_base_url.take()) {
            Some(url) => Some(
                normalize_base_url(&url).map_err(|error| Error::Config(error.to_string()))?,
            ),
            None => None,
        };
        let mut seen = Vec::with_capacity(self.privacy_keys.len());
        for key in self.privacy_keys {
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        self.privacy_keys = seen;
        Ok(self)
    }
}

fn parse_env_flag(name: &str, raw: &str) -> Result<bool> {
    parse_flag(raw).ok_or_else(|| Error::Config(format!("{name} must be a boolean, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_track_every_privacy_key() {
        let config = SettingsConfig::default();
        assert_eq!(config.privacy_keys, PrivacyKey::ALL.to_vec());
        assert!(config.instant_unconfirmed_toggle);
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let error = SettingsConfig::parse(r#"{"api_base_url":"https://a.example","bogus":1}"#)
            .unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn parse_normalizes_url_and_dedups_keys() {
        let raw = r#"{
            "api_base_url": "https://api.example.com/",
            "privacy_keys": ["calls", "calls", "last_seen"]
        }"#;
        let config = SettingsConfig::parse(raw).unwrap();
        assert_eq!(config.api_base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(
            config.privacy_keys,
            vec![PrivacyKey::Calls, PrivacyKey::LastSeen]
        );
    }

    #[test]
    fn env_overrides_file_values() {
        let env = HashMap::from([
            (ENV_API_URL, "http://localhost:8080/"),
            (ENV_INSTANT_UNCONFIRMED_TOGGLE, "off"),
        ]);
        let config = SettingsConfig::default()
            .merge_env(|name| env.get(name).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.api_base_url.as_deref(), Some("http://localhost:8080"));
        assert!(!config.instant_unconfirmed_toggle);
        assert!(config.idle_supported);
    }

    #[test]
    fn env_rejects_bad_flags_and_urls() {
        let bad_flag = SettingsConfig::default()
            .merge_env(|name| (name == ENV_IDLE_SUPPORTED).then(|| "sometimes".to_string()));
        assert!(bad_flag.is_err());

        let bad_url = SettingsConfig::default()
            .merge_env(|name| (name == ENV_API_URL).then(|| "ftp://x".to_string()));
        assert!(matches!(bad_url, Err(Error::Config(_))));
    }
}
