//! Typed view over the key/value settings table

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Duration;

use crate::sync::TransportMode;

pub const API_BASE_URL: &str = "api.base_url";
pub const API_TIMEOUT_MS: &str = "api.timeout_ms";
pub const API_CONNECT_TIMEOUT_MS: &str = "api.connect_timeout_ms";
pub const API_MAX_ATTEMPTS: &str = "api.max_attempts";
pub const SYNC_TRANSPORT: &str = "sync.transport";
pub const SYNC_CHANNEL: &str = "sync.channel";
pub const SYNC_POLL_INTERVAL_MS: &str = "sync.poll_interval_ms";
pub const SYNC_SOURCE: &str = "sync.source";
pub const LOAD_OFFLINE_FALLBACK: &str = "load.offline_fallback";

/// Known setting: key, default value, description
pub struct SettingSpec {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

pub const KNOWN_SETTINGS: &[SettingSpec] = &[
    SettingSpec {
        key: API_BASE_URL,
        default: "http://localhost:5000/api",
        description: "Base URL of the chapter document API",
    },
    SettingSpec {
        key: API_TIMEOUT_MS,
        default: "10000",
        description: "Request timeout in milliseconds",
    },
    SettingSpec {
        key: API_CONNECT_TIMEOUT_MS,
        default: "5000",
        description: "Connection timeout in milliseconds",
    },
    SettingSpec {
        key: API_MAX_ATTEMPTS,
        default: "3",
        description: "Attempts per request before giving up on transient failures",
    },
    SettingSpec {
        key: SYNC_TRANSPORT,
        default: "auto",
        description: "Change notification transport: auto, broadcast or storage",
    },
    SettingSpec {
        key: SYNC_CHANNEL,
        default: "lms_admin_updates",
        description: "Broadcast channel name",
    },
    SettingSpec {
        key: SYNC_POLL_INTERVAL_MS,
        default: "1000",
        description: "Polling interval of the storage watcher in milliseconds",
    },
    SettingSpec {
        key: SYNC_SOURCE,
        default: "lms-admin",
        description: "Source label stamped on change notifications",
    },
    SettingSpec {
        key: LOAD_OFFLINE_FALLBACK,
        default: "true",
        description: "Fall back to the local cache when the API is unreachable",
    },
];

pub fn find_spec(key: &str) -> Option<&'static SettingSpec> {
    KNOWN_SETTINGS.iter().find(|spec| spec.key == key)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_attempts: u32,
    pub transport: TransportMode,
    pub channel: String,
    pub poll_interval: Duration,
    pub source: String,
    pub offline_fallback: bool,
}

impl Default for Settings {
    fn default() -> Self {
        // Defaults in KNOWN_SETTINGS always parse; covered by a test below
        Self::from_values(&HashMap::new()).unwrap_or_else(|_| Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            api_timeout: Duration::from_millis(10_000),
            connect_timeout: Duration::from_millis(5_000),
            max_attempts: 3,
            transport: TransportMode::Auto,
            channel: "lms_admin_updates".to_string(),
            poll_interval: Duration::from_millis(1_000),
            source: "lms-admin".to_string(),
            offline_fallback: true,
        })
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    let millis: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{}' must be a number of milliseconds, got '{}'", key, raw))?;
    Ok(Duration::from_millis(millis))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => anyhow::bail!("'{}' must be true or false, got '{}'", key, raw),
    }
}

impl Settings {
    /// Build settings from stored values, falling back to defaults per key
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let value = |key: &str| -> &str {
            values
                .get(key)
                .map(String::as_str)
                .or_else(|| find_spec(key).map(|spec| spec.default))
                .unwrap_or_default()
        };

        let max_attempts: u32 = value(API_MAX_ATTEMPTS)
            .trim()
            .parse()
            .with_context(|| format!("'{}' must be a positive integer", API_MAX_ATTEMPTS))?;

        Ok(Self {
            api_base_url: value(API_BASE_URL).trim_end_matches('/').to_string(),
            api_timeout: parse_millis(API_TIMEOUT_MS, value(API_TIMEOUT_MS))?,
            connect_timeout: parse_millis(API_CONNECT_TIMEOUT_MS, value(API_CONNECT_TIMEOUT_MS))?,
            max_attempts: max_attempts.max(1),
            transport: value(SYNC_TRANSPORT)
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?,
            channel: value(SYNC_CHANNEL).to_string(),
            poll_interval: parse_millis(SYNC_POLL_INTERVAL_MS, value(SYNC_POLL_INTERVAL_MS))?,
            source: value(SYNC_SOURCE).to_string(),
            offline_fallback: parse_bool(LOAD_OFFLINE_FALLBACK, value(LOAD_OFFLINE_FALLBACK))?,
        })
    }

    /// Reject unknown keys and values that would not parse
    pub fn validate(key: &str, value: &str) -> Result<()> {
        if find_spec(key).is_none() {
            anyhow::bail!("Unknown setting '{}'", key);
        }
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        Self::from_values(&values).map(|_| ())
    }

    /// Apply `LMS_ADMIN_API_URL` / `LMS_ADMIN_TIMEOUT_MS` from the environment (or `.env`)
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("LMS_ADMIN_API_URL") {
            log::debug!("API base URL overridden from environment");
            self.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(raw) = std::env::var("LMS_ADMIN_TIMEOUT_MS") {
            self.api_timeout = parse_millis("LMS_ADMIN_TIMEOUT_MS", &raw)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let settings = Settings::from_values(&HashMap::new()).unwrap();
        assert_eq!(settings.api_base_url, "http://localhost:5000/api");
        assert_eq!(settings.api_timeout, Duration::from_secs(10));
        assert_eq!(settings.transport, TransportMode::Auto);
        assert_eq!(settings.channel, "lms_admin_updates");
        assert!(settings.offline_fallback);
        assert_eq!(Settings::default(), settings);
    }

    #[test]
    fn test_stored_values_override_defaults() {
        let mut values = HashMap::new();
        values.insert(API_BASE_URL.to_string(), "https://cms.example.org/api/".to_string());
        values.insert(SYNC_TRANSPORT.to_string(), "storage".to_string());
        values.insert(LOAD_OFFLINE_FALLBACK.to_string(), "no".to_string());

        let settings = Settings::from_values(&values).unwrap();
        assert_eq!(settings.api_base_url, "https://cms.example.org/api");
        assert_eq!(settings.transport, TransportMode::Storage);
        assert!(!settings.offline_fallback);
    }

    #[test]
    fn test_validate() {
        assert!(Settings::validate(API_TIMEOUT_MS, "2500").is_ok());
        assert!(Settings::validate(API_TIMEOUT_MS, "soon").is_err());
        assert!(Settings::validate(SYNC_TRANSPORT, "carrier-pigeon").is_err());
        assert!(Settings::validate("ui.theme", "dark").is_err());
    }
}
