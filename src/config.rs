use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::Receiver;
use crate::selector::SelectorPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub receiver: ReceiverConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/flightcache.db")
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_source_url() -> String {
    "http://192.168.1.243:8080/aircraft".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_display_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            url: default_display_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_display_url() -> String {
    "http://127.0.0.1:9999/api/display".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    #[serde(default = "default_receiver_lat")]
    pub lat: f64,
    #[serde(default = "default_receiver_lon")]
    pub lon: f64,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            lat: default_receiver_lat(),
            lon: default_receiver_lon(),
        }
    }
}

fn default_receiver_lat() -> f64 {
    47.60
}

fn default_receiver_lon() -> f64 {
    -122.33
}

impl ReceiverConfig {
    pub fn location(&self) -> Receiver {
        Receiver {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelectorConfig {
    /// Cycle-level freshness limit. Looser than the selector's own default
    /// so the display favors showing something over strict freshness.
    #[serde(default = "default_max_age_seconds")]
    pub max_age_seconds: f64,
    #[serde(default = "default_min_accuracy")]
    pub min_accuracy: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_age_seconds: default_max_age_seconds(),
            min_accuracy: default_min_accuracy(),
        }
    }
}

fn default_max_age_seconds() -> f64 {
    30.0
}

fn default_min_accuracy() -> u32 {
    5
}

impl SelectorConfig {
    pub fn policy(&self) -> SelectorPolicy {
        SelectorPolicy {
            max_age_seconds: self.max_age_seconds,
            min_accuracy: self.min_accuracy,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Positive-cache TTL. Reserved for the future metadata enrichment
    /// call; the current decision logic only consumes the negative TTL.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
    #[serde(default = "default_ttl_hours")]
    pub negative_ttl_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            negative_ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_ttl_hours() -> i64 {
    24
}

impl CacheConfig {
    pub fn negative_ttl_secs(&self) -> i64 {
        self.negative_ttl_hours * 3600
    }
}

/// Load and validate the configuration.
///
/// Every field has a default, so a missing config file means "all
/// defaults" rather than an error; a present-but-unreadable or invalid
/// file still fails.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if !(-90.0..=90.0).contains(&config.receiver.lat) || !config.receiver.lat.is_finite() {
        anyhow::bail!("receiver.lat must be a finite value in [-90, 90]");
    }
    if !(-180.0..=180.0).contains(&config.receiver.lon) || !config.receiver.lon.is_finite() {
        anyhow::bail!("receiver.lon must be a finite value in [-180, 180]");
    }
    if config.poll.interval_secs == 0 {
        anyhow::bail!("poll.interval_secs must be > 0");
    }
    if !config.selector.max_age_seconds.is_finite() || config.selector.max_age_seconds <= 0.0 {
        anyhow::bail!("selector.max_age_seconds must be > 0");
    }
    if config.cache.ttl_hours <= 0 || config.cache.negative_ttl_hours <= 0 {
        anyhow::bail!("cache TTLs must be > 0");
    }
    if config.source.url.is_empty() || config.display.url.is_empty() {
        anyhow::bail!("source.url and display.url must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.poll.interval_secs, 60);
        assert_eq!(config.cache.negative_ttl_hours, 24);
        assert_eq!(config.selector.max_age_seconds, 30.0);
        assert_eq!(config.receiver.lat, 47.60);
        validate(&config).unwrap();
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: Config = toml::from_str(
            r#"
            [receiver]
            lat = 51.47
            lon = -0.45

            [poll]
            interval_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.receiver.lat, 51.47);
        assert_eq!(config.poll.interval_secs, 15);
        // Untouched sections keep their defaults.
        assert_eq!(config.cache.ttl_hours, 24);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.receiver.lat = 91.0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.poll.interval_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.cache.negative_ttl_hours = 0;
        assert!(validate(&config).is_err());
    }
}
