//! Table schema and row types for the weather store

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wxp_core::WeatherPoint;

/// Table names
pub mod tables {
    pub const POINTS: &str = "weather_points";
    pub const SNAPSHOTS: &str = "aggregate_snapshots";
}

/// Snapshot rows kept after each save (rolling window)
pub const SNAPSHOT_CAP: i64 = 100;

/// Point table DDL. `(latitude, longitude, timestamp)` is the point
/// identity: re-ingesting the same window upserts instead of duplicating.
pub const CREATE_POINTS: &str = r#"
CREATE TABLE IF NOT EXISTS weather_points (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    location_name TEXT NOT NULL DEFAULT 'Unknown',
    temperature REAL NOT NULL,
    humidity REAL NOT NULL,
    pressure REAL NOT NULL,
    wind_speed REAL NOT NULL DEFAULT 0,
    rainfall REAL NOT NULL DEFAULT 0,
    wind_direction REAL NOT NULL DEFAULT 0,
    cloudiness REAL NOT NULL DEFAULT 0,
    visibility REAL NOT NULL DEFAULT 0,
    uv_index REAL NOT NULL DEFAULT 0,
    feels_like REAL NOT NULL DEFAULT 0,
    dew_point REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (latitude, longitude, timestamp)
)
"#;

pub const CREATE_SNAPSHOTS: &str = r#"
CREATE TABLE IF NOT EXISTS aggregate_snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    computed_at INTEGER NOT NULL,
    stats_json TEXT NOT NULL,
    analytics_json TEXT
)
"#;

/// Range queries and ordering lean on this as the table grows
pub const CREATE_TIMESTAMP_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_weather_points_timestamp ON weather_points(timestamp)";

/// Stored weather point row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PointRow {
    pub id: i64,
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
    pub wind_direction: f64,
    pub cloudiness: f64,
    pub visibility: f64,
    pub uv_index: f64,
    pub feels_like: f64,
    pub dew_point: f64,
}

impl PointRow {
    pub fn into_point(self) -> WeatherPoint {
        WeatherPoint {
            timestamp: self.timestamp,
            latitude: self.latitude,
            longitude: self.longitude,
            location_name: self.location_name,
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure,
            wind_speed: self.wind_speed,
            rainfall: self.rainfall,
            wind_direction: self.wind_direction,
            cloudiness: self.cloudiness,
            visibility: self.visibility,
            uv_index: self.uv_index,
            feels_like: self.feels_like,
            dew_point: self.dew_point,
        }
    }
}

/// One row of interval-grouped summary; derived, never persisted
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BucketRow {
    pub time_period: String,
    pub avg_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub avg_humidity: f64,
    pub avg_pressure: f64,
    pub avg_wind_speed: f64,
    pub total_rainfall: f64,
    pub data_points: i64,
}

/// Cached aggregate computation
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub computed_at: i64,
    pub stats_json: String,
    pub analytics_json: Option<String>,
}

/// Overview of the stored dataset
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub total_points: i64,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub latest: Option<LatestReading>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LatestReading {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

/// Calendar bucketing granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketInterval {
    Hour,
    Day,
    Week,
    Month,
}

impl BucketInterval {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// strftime format used as the calendar truncation of `timestamp`
    pub fn truncation(self) -> &'static str {
        match self {
            Self::Hour => "%Y-%m-%d %H",
            Self::Day => "%Y-%m-%d",
            Self::Week => "%Y-%W",
            Self::Month => "%Y-%m",
        }
    }

    /// Response size cap per granularity (coarser intervals need fewer rows)
    pub fn max_rows(self) -> i64 {
        match self {
            Self::Hour | Self::Day => 100,
            Self::Week => 52,
            Self::Month => 24,
        }
    }
}
