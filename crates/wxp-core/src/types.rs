//! Core data types for normalized weather points

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix epoch seconds)
pub type Timestamp = i64;

/// Label used when no display name is known for a location
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Fallback values applied when the upstream payload omits a primary metric.
///
/// Extended metrics (wind direction, cloudiness, ...) fall back to 0.0.
pub mod fetch_defaults {
    pub const TEMPERATURE: f64 = 20.0;
    pub const HUMIDITY: f64 = 50.0;
    pub const PRESSURE: f64 = 1013.25;
    pub const WIND_SPEED: f64 = 5.0;
    pub const RAINFALL: f64 = 0.0;
}

/// One normalized observation or forecasted hour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherPoint {
    /// Unix timestamp of the reading (primary temporal key)
    pub timestamp: Timestamp,

    /// Location the point describes, in decimal degrees
    pub latitude: f64,
    pub longitude: f64,

    /// Display label for the location
    pub location_name: String,

    /// Air temperature (°C)
    pub temperature: f64,

    /// Relative humidity (%)
    pub humidity: f64,

    /// Surface pressure (hPa)
    pub pressure: f64,

    /// Wind speed (provider unit, not cross-validated)
    pub wind_speed: f64,

    /// Precipitation (mm)
    pub rainfall: f64,

    // Extended metrics, 0.0 when the provider does not report them
    #[serde(default)]
    pub wind_direction: f64,
    #[serde(default)]
    pub cloudiness: f64,
    #[serde(default)]
    pub visibility: f64,
    #[serde(default)]
    pub uv_index: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub dew_point: f64,
}

impl WeatherPoint {
    /// Create a point for a location with every metric at its fetch default
    pub fn new(timestamp: Timestamp, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            location_name: UNKNOWN_LOCATION.to_string(),
            temperature: fetch_defaults::TEMPERATURE,
            humidity: fetch_defaults::HUMIDITY,
            pressure: fetch_defaults::PRESSURE,
            wind_speed: fetch_defaults::WIND_SPEED,
            rainfall: fetch_defaults::RAINFALL,
            wind_direction: 0.0,
            cloudiness: 0.0,
            visibility: 0.0,
            uv_index: 0.0,
            feels_like: 0.0,
            dew_point: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_point_defaults() {
        let point = WeatherPoint::new(1_700_000_000, 51.5074, -0.1278);

        assert_eq!(point.timestamp, 1_700_000_000);
        assert_eq!(point.location_name, UNKNOWN_LOCATION);
        assert_eq!(point.temperature, fetch_defaults::TEMPERATURE);
        assert_eq!(point.pressure, fetch_defaults::PRESSURE);
        assert_eq!(point.uv_index, 0.0);
    }

    #[test]
    fn test_point_serde_defaults_extended_fields() {
        let json = r#"{
            "timestamp": 1700000000,
            "latitude": 51.5,
            "longitude": -0.1,
            "location_name": "London",
            "temperature": 18.2,
            "humidity": 71.0,
            "pressure": 1009.4,
            "wind_speed": 4.2,
            "rainfall": 0.3
        }"#;
        let point: WeatherPoint = serde_json::from_str(json).unwrap();

        assert_eq!(point.temperature, 18.2);
        assert_eq!(point.wind_direction, 0.0);
        assert_eq!(point.dew_point, 0.0);
    }
}
