//! Provider response payload shapes
//!
//! Mirrors the Open-Meteo forecast response: an optional `current` object
//! (flat field map) and an optional `hourly` object (parallel arrays of
//! equal nominal length, entries nullable). Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Raw provider payload, as deserialized from the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawForecast {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentConditions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlySeries>,
}

impl RawForecast {
    /// True when neither a current reading nor an hourly series is present
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.hourly.is_none()
    }
}

/// Instantaneous reading; every field may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CurrentConditions {
    #[serde(default)]
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default)]
    pub surface_pressure: Option<f64>,
    #[serde(default)]
    pub wind_speed_10m: Option<f64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
    #[serde(default)]
    pub wind_direction_10m: Option<f64>,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
    #[serde(default)]
    pub apparent_temperature: Option<f64>,
    #[serde(default)]
    pub dew_point_2m: Option<f64>,
}

/// Parallel time-indexed arrays; the `time` array defines the series length
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub surface_pressure: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    pub visibility: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index: Vec<Option<f64>>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub dew_point_2m: Vec<Option<f64>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_response() {
        let json = r#"{
            "latitude": 51.5,
            "longitude": -0.12,
            "current": {
                "time": "2024-01-15T12:00",
                "temperature_2m": 8.4,
                "relative_humidity_2m": 82,
                "surface_pressure": 1011.2,
                "wind_speed_10m": 13.1,
                "precipitation": 0.0
            },
            "hourly": {
                "time": ["2024-01-15T13:00", "2024-01-15T14:00"],
                "temperature_2m": [8.9, null],
                "relative_humidity_2m": [80, 79],
                "surface_pressure": [1011.0, 1010.6],
                "wind_speed_10m": [12.4, 11.8],
                "precipitation": [0.0, 0.2]
            }
        }"#;

        let payload: RawForecast = serde_json::from_str(json).unwrap();
        let current = payload.current.unwrap();
        assert_eq!(current.temperature_2m, Some(8.4));
        assert_eq!(current.wind_direction_10m, None);

        let hourly = payload.hourly.unwrap();
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly.temperature_2m[1], None);
        assert_eq!(hourly.precipitation[1], Some(0.2));
    }

    #[test]
    fn test_deserialize_empty_response() {
        let payload: RawForecast = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_hourly_length_follows_time_array() {
        let json = r#"{"hourly": {"time": ["a", "b", "c"], "temperature_2m": [1.0]}}"#;
        let payload: RawForecast = serde_json::from_str(json).unwrap();
        assert_eq!(payload.hourly.unwrap().len(), 3);
    }
}
