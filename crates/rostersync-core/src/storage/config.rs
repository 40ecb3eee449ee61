//! TOML-based application configuration.
//!
//! Stores:
//! - Poll cadence, render tick and cooldown window
//! - Upstream API location and request timeout
//! - Render colors per status kind
//! - The default faction to watch
//!
//! Configuration is stored at `~/.config/rostersync/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::roster::ColorHint;
use crate::sync::SyncSettings;

/// Polling and render cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Minimum seconds between two poll attempts.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Render/sort tick in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Cooldown after a rate limit or fetch failure.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

/// Upstream API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Hex colors per status kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(default = "default_ready_color")]
    pub ready: String,
    #[serde(default = "default_countdown_color")]
    pub countdown: String,
    #[serde(default = "default_travel_color")]
    pub travel: String,
    #[serde(default = "default_other_color")]
    pub other: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/rostersync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    /// Faction watched when none is given on the command line.
    #[serde(default)]
    pub default_faction: Option<String>,
}

// Default functions
fn default_interval_secs() -> u64 {
    5
}
fn default_tick_ms() -> u64 {
    1_000
}
fn default_cooldown_secs() -> u64 {
    300
}
fn default_base_url() -> String {
    "https://api.torn.com".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_ready_color() -> String {
    ColorHint::Ready.default_hex().into()
}
fn default_countdown_color() -> String {
    ColorHint::Countdown.default_hex().into()
}
fn default_travel_color() -> String {
    ColorHint::Travel.default_hex().into()
}
fn default_other_color() -> String {
    ColorHint::Other.default_hex().into()
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            tick_ms: default_tick_ms(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            ready: default_ready_color(),
            countdown: default_countdown_color(),
            travel: default_travel_color(),
            other: default_other_color(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            polling: PollingConfig::default(),
            api: ApiConfig::default(),
            colors: ColorsConfig::default(),
            default_faction: None,
        }
    }
}

impl ColorsConfig {
    pub fn hex_for(&self, hint: ColorHint) -> &str {
        match hint {
            ColorHint::Ready => &self.ready,
            ColorHint::Countdown => &self.countdown,
            ColorHint::Travel => &self.travel,
            ColorHint::Other => &self.other,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    // optional strings serialize as null when unset
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/rostersync"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value in memory by dot-separated key, validating the result.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and persist. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.polling.interval_secs == 0 {
            return Err(invalid("polling.interval_secs", "must be at least 1"));
        }
        if self.polling.tick_ms < 100 {
            return Err(invalid("polling.tick_ms", "must be at least 100"));
        }
        if self.polling.cooldown_secs == 0 {
            return Err(invalid("polling.cooldown_secs", "must be at least 1"));
        }
        if self.api.timeout_secs == 0 {
            return Err(invalid("api.timeout_secs", "must be at least 1"));
        }
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(invalid("api.base_url", "not a valid URL"));
        }
        for (key, hex) in [
            ("colors.ready", &self.colors.ready),
            ("colors.countdown", &self.colors.countdown),
            ("colors.travel", &self.colors.travel),
            ("colors.other", &self.colors.other),
        ] {
            if !is_hex_color(hex) {
                return Err(invalid(key, "expected #RRGGBB"));
            }
        }
        Ok(())
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            poll_interval: Duration::from_secs(self.polling.interval_secs),
            tick_interval: Duration::from_millis(self.polling.tick_ms),
            cooldown: Duration::from_secs(self.polling.cooldown_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.polling.interval_secs, 5);
        assert_eq!(parsed.polling.cooldown_secs, 300);
        assert_eq!(parsed.colors.countdown, "#FF6666");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[polling]\ninterval_secs = 10\n").unwrap();
        assert_eq!(parsed.polling.interval_secs, 10);
        assert_eq!(parsed.polling.tick_ms, 1_000);
        assert_eq!(parsed.api.base_url, "https://api.torn.com");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("polling.interval_secs").as_deref(), Some("5"));
        assert_eq!(cfg.get("colors.ready").as_deref(), Some("#66FF66"));
        assert!(cfg.get("polling.missing_key").is_none());
    }

    #[test]
    fn set_value_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.set_value("polling.cooldown_secs", "120").unwrap();
        cfg.set_value("default_faction", "8151").unwrap();
        assert_eq!(cfg.polling.cooldown_secs, 120);
        assert_eq!(cfg.default_faction.as_deref(), Some("8151"));
    }

    #[test]
    fn set_value_rejects_unknown_and_invalid() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set_value("polling.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set_value("polling.interval_secs", "abc"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set_value("polling.interval_secs", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set_value("colors.ready", "green"),
            Err(ConfigError::InvalidValue { .. })
        ));
        // failed sets leave the config untouched
        assert_eq!(cfg.polling.interval_secs, 5);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.polling.tick_ms, 1_000);
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set_value("api.timeout_secs", "3").unwrap();
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.timeout_secs, 3);
    }

    #[test]
    fn sync_settings_from_config() {
        let settings = Config::default().sync_settings();
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.tick_interval, Duration::from_millis(1_000));
        assert_eq!(settings.cooldown, Duration::from_secs(300));
    }
}
