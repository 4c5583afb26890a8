use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub max_points: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: Option<HttpConfig>,
    pub database: Option<DatabaseConfig>,
    pub upstream: Option<UpstreamConfig>,
    pub ingest: Option<IngestConfig>,
    pub retention: Option<RetentionConfig>,
    pub location: Option<LocationConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from the WXP_CONFIG path (TOML) if present, with
    /// reasonable defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WXP_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let cfg = if Path::new(&path).exists() {
            let s = fs::read_to_string(&path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.bind.clone())
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
    }

    /// SQLite database path (default weather.db in the working directory)
    pub fn database_path(&self) -> String {
        self.database
            .as_ref()
            .and_then(|d| d.path.clone())
            .unwrap_or_else(|| "weather.db".to_string())
    }

    /// Forecast provider endpoint
    pub fn upstream_base_url(&self) -> String {
        self.upstream
            .as_ref()
            .and_then(|u| u.base_url.clone())
            .unwrap_or_else(|| "https://api.open-meteo.com/v1/forecast".to_string())
    }

    /// Bound on one upstream request (default 10 s)
    pub fn upstream_timeout(&self) -> Duration {
        let secs = self
            .upstream
            .as_ref()
            .and_then(|u| u.timeout_secs)
            .unwrap_or(10);
        Duration::from_secs(secs)
    }

    /// Cap on points normalized from one fetch (default 24)
    pub fn max_points(&self) -> usize {
        self.ingest.as_ref().and_then(|i| i.max_points).unwrap_or(24)
    }

    /// Retention window in days (default 30)
    pub fn retention_days(&self) -> u32 {
        self.retention.as_ref().and_then(|r| r.days).unwrap_or(30)
    }

    /// Default ingest location (London when unconfigured)
    pub fn default_location(&self) -> (f64, f64, String) {
        let latitude = self
            .location
            .as_ref()
            .and_then(|l| l.latitude)
            .unwrap_or(51.5074);
        let longitude = self
            .location
            .as_ref()
            .and_then(|l| l.longitude)
            .unwrap_or(-0.1278);
        let name = self
            .location
            .as_ref()
            .and_then(|l| l.name.clone())
            .unwrap_or_else(|| "London".to_string());
        (latitude, longitude, name)
    }
}
