//! Process configuration
//!
//! Built once at startup from defaults, an optional TOML file, and
//! environment variables (highest precedence), then handed to each
//! component constructor. Nothing reads the environment afterwards.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use wxs_core::ThresholdConfig;

pub const DEFAULT_PROVIDER_ENDPOINT: &str = "https://api.tomorrow.io/v4/weather/realtime";
pub const DEFAULT_LATITUDE: f64 = -29.6846;
pub const DEFAULT_LONGITUDE: f64 = -51.1419;
pub const DEFAULT_STREAM_NAME: &str = "broker";
pub const DEFAULT_STREAM_RETENTION: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PROVIDER_ENDPOINT.to_string(),
            api_key: String::new(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub name: String,
    /// Max records held in the in-process stream
    pub retention: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_STREAM_NAME.to_string(),
            retention: DEFAULT_STREAM_RETENTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub topic: String,
    /// POST alerts here instead of only logging them
    pub webhook_url: Option<String>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            topic: "weather-alerts".to_string(),
            webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub bucket: String,
    /// Filesystem root of the object store
    pub root: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            root: "archive".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Seconds between producer invocations
    pub poll_interval: u64,
    /// Max records per consumer batch
    pub batch_size: usize,
    pub http_bind: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval: 60,
            batch_size: 100,
            http_bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub stream: StreamConfig,
    pub thresholds: ThresholdConfig,
    pub alerts: AlertsConfig,
    pub archive: ArchiveConfig,
    pub daemon: DaemonConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl AppConfig {
    /// Load from the WXS_CONFIG path (TOML, default `wxs.toml`) if present,
    /// then apply environment overrides
    pub fn load() -> ConfigResult<Self> {
        let path = std::env::var("WXS_CONFIG").unwrap_or_else(|_| "wxs.toml".to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_str(&fs::read_to_string(&path)?)?
        } else {
            Self::default()
        };
        base.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str::<AppConfig>(s)?)
    }

    /// Defaults plus overrides from `lookup`
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Apply environment-style overrides. Blank values count as unset.
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TOMORROW_API_KEY") {
            self.provider.api_key = v;
        }
        if let Some(v) = get("PROVIDER_ENDPOINT") {
            self.provider.endpoint = v;
        }
        if let Some(v) = get("LATITUDE") {
            self.provider.latitude = parse("LATITUDE", &v)?;
        }
        if let Some(v) = get("LONGITUDE") {
            self.provider.longitude = parse("LONGITUDE", &v)?;
        }
        if let Some(v) = get("STREAM_NAME") {
            self.stream.name = v;
        }
        if let Some(v) = get("STREAM_RETENTION") {
            self.stream.retention = parse("STREAM_RETENTION", &v)?;
        }

        if let Some(v) = get("PRECIPITATION_PROBABILITY") {
            self.thresholds.precipitation_probability = parse("PRECIPITATION_PROBABILITY", &v)?;
        }
        if let Some(v) = get("WIND_SPEED") {
            self.thresholds.wind_speed = parse("WIND_SPEED", &v)?;
        }
        if let Some(v) = get("WIND_GUST") {
            self.thresholds.wind_gust = parse("WIND_GUST", &v)?;
        }
        if let Some(v) = get("RAIN_INTENSITY") {
            self.thresholds.rain_intensity = parse("RAIN_INTENSITY", &v)?;
        }

        if let Some(v) = get("ALERT_TOPIC") {
            self.alerts.topic = v;
        }
        if let Some(v) = get("ALERT_WEBHOOK_URL") {
            self.alerts.webhook_url = Some(v);
        }
        if let Some(v) = get("BUCKET_NAME") {
            self.archive.bucket = v;
        }
        if let Some(v) = get("ARCHIVE_ROOT") {
            self.archive.root = v;
        }

        if let Some(v) = get("POLL_INTERVAL") {
            self.daemon.poll_interval = parse("POLL_INTERVAL", &v)?;
        }
        if let Some(v) = get("BATCH_SIZE") {
            self.daemon.batch_size = parse("BATCH_SIZE", &v)?;
        }
        if let Some(v) = get("HTTP_BIND") {
            self.daemon.http_bind = v;
        }

        Ok(self)
    }

    /// Settings without which the pipeline cannot run
    pub fn validate(&self) -> ConfigResult<()> {
        if self.archive.bucket.trim().is_empty() {
            return Err(ConfigError::Missing("BUCKET_NAME"));
        }
        if self.stream.name.trim().is_empty() {
            return Err(ConfigError::Missing("STREAM_NAME"));
        }
        if self.stream.retention < self.daemon.batch_size {
            return Err(ConfigError::InvalidValue {
                name: "STREAM_RETENTION".into(),
                value: self.stream.retention.to_string(),
            });
        }
        if self.daemon.poll_interval == 0 {
            return Err(ConfigError::InvalidValue {
                name: "POLL_INTERVAL".into(),
                value: "0".into(),
            });
        }
        if self.daemon.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "BATCH_SIZE".into(),
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// Whether a real provider key is configured
    pub fn has_provider_key(&self) -> bool {
        !self.provider.api_key.trim().is_empty()
    }
}

fn parse<T: std::str::FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}
