//! Payload normalization into uniform weather points

use crate::payload::RawForecast;
use wxp_core::{fetch_defaults, Timestamp, WeatherPoint, UNKNOWN_LOCATION};

/// Spacing between consecutive hourly forecast points
pub const HOUR_SECS: i64 = 3600;

/// Location a fetch was issued for
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

impl LocationRequest {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
        }
    }

    pub fn named(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: Some(name.into()),
        }
    }

    fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
    }
}

fn value_at(series: &[Option<f64>], index: usize, default: f64) -> f64 {
    series.get(index).copied().flatten().unwrap_or(default)
}

/// Convert one raw payload into an ordered sequence of weather points.
///
/// The current reading (if present) becomes the first point at `now`; the
/// hourly series is zipped index-by-index into points one hour apart,
/// stopping at array exhaustion or after `max_points - 1` additional
/// points (one slot stays reserved for the current reading). Missing or
/// null fields take the per-field fetch defaults so a partial payload
/// never aborts the batch. An empty payload yields an empty vector.
pub fn normalize(
    payload: RawForecast,
    location: &LocationRequest,
    max_points: usize,
    now: Timestamp,
) -> Vec<WeatherPoint> {
    let mut points = Vec::new();
    if max_points == 0 {
        return points;
    }

    let name = location.display_name();

    if let Some(current) = payload.current {
        let mut point = WeatherPoint::new(now, location.latitude, location.longitude);
        point.location_name = name.clone();
        point.temperature = current
            .temperature_2m
            .unwrap_or(fetch_defaults::TEMPERATURE);
        point.humidity = current
            .relative_humidity_2m
            .unwrap_or(fetch_defaults::HUMIDITY);
        point.pressure = current.surface_pressure.unwrap_or(fetch_defaults::PRESSURE);
        point.wind_speed = current.wind_speed_10m.unwrap_or(fetch_defaults::WIND_SPEED);
        point.rainfall = current.precipitation.unwrap_or(fetch_defaults::RAINFALL);
        point.wind_direction = current.wind_direction_10m.unwrap_or(0.0);
        point.cloudiness = current.cloud_cover.unwrap_or(0.0);
        point.visibility = current.visibility.unwrap_or(0.0);
        point.uv_index = current.uv_index.unwrap_or(0.0);
        point.feels_like = current.apparent_temperature.unwrap_or(0.0);
        point.dew_point = current.dew_point_2m.unwrap_or(0.0);
        points.push(point);
    }

    if let Some(hourly) = payload.hourly {
        let remaining = max_points.saturating_sub(1);
        let count = hourly.len().min(remaining);

        for i in 0..count {
            let timestamp = now + (i as i64 + 1) * HOUR_SECS;
            let mut point = WeatherPoint::new(timestamp, location.latitude, location.longitude);
            point.location_name = name.clone();
            point.temperature =
                value_at(&hourly.temperature_2m, i, fetch_defaults::TEMPERATURE);
            point.humidity = value_at(&hourly.relative_humidity_2m, i, fetch_defaults::HUMIDITY);
            point.pressure = value_at(&hourly.surface_pressure, i, fetch_defaults::PRESSURE);
            point.wind_speed = value_at(&hourly.wind_speed_10m, i, fetch_defaults::WIND_SPEED);
            point.rainfall = value_at(&hourly.precipitation, i, fetch_defaults::RAINFALL);
            point.wind_direction = value_at(&hourly.wind_direction_10m, i, 0.0);
            point.cloudiness = value_at(&hourly.cloud_cover, i, 0.0);
            point.visibility = value_at(&hourly.visibility, i, 0.0);
            point.uv_index = value_at(&hourly.uv_index, i, 0.0);
            point.feels_like = value_at(&hourly.apparent_temperature, i, 0.0);
            point.dew_point = value_at(&hourly.dew_point_2m, i, 0.0);
            points.push(point);
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{CurrentConditions, HourlySeries};

    const NOW: i64 = 1_700_000_000;

    fn payload_with_hours(hours: usize) -> RawForecast {
        RawForecast {
            current: Some(CurrentConditions {
                temperature_2m: Some(9.5),
                relative_humidity_2m: Some(80.0),
                surface_pressure: Some(1012.0),
                wind_speed_10m: Some(11.0),
                precipitation: Some(0.1),
                ..Default::default()
            }),
            hourly: Some(HourlySeries {
                time: (0..hours).map(|i| format!("t{i}")).collect(),
                temperature_2m: (0..hours).map(|i| Some(10.0 + i as f64)).collect(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_completeness_with_current_and_hourly() {
        let location = LocationRequest::new(51.5, -0.1);

        // Series shorter than the cap
        let points = normalize(payload_with_hours(5), &location, 24, NOW);
        assert_eq!(points.len(), 6);

        // Series longer than the cap: one slot is reserved for current
        let points = normalize(payload_with_hours(48), &location, 24, NOW);
        assert_eq!(points.len(), 24);
    }

    #[test]
    fn test_timestamps_strictly_increasing() {
        let location = LocationRequest::new(51.5, -0.1);
        let points = normalize(payload_with_hours(12), &location, 24, NOW);

        assert_eq!(points[0].timestamp, NOW);
        for pair in points.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
            assert_eq!(pair[1].timestamp - pair[0].timestamp, HOUR_SECS);
        }
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let payload = RawForecast {
            current: Some(CurrentConditions::default()),
            hourly: Some(HourlySeries {
                time: vec!["t0".into(), "t1".into()],
                // temperature present only for index 0, second entry null
                temperature_2m: vec![Some(3.0), None],
                ..Default::default()
            }),
        };
        let location = LocationRequest::new(51.5, -0.1);
        let points = normalize(payload, &location, 24, NOW);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].temperature, fetch_defaults::TEMPERATURE);
        assert_eq!(points[0].pressure, fetch_defaults::PRESSURE);
        assert_eq!(points[1].temperature, 3.0);
        assert_eq!(points[1].humidity, fetch_defaults::HUMIDITY);
        assert_eq!(points[2].temperature, fetch_defaults::TEMPERATURE);
    }

    #[test]
    fn test_empty_payload_yields_no_points() {
        let location = LocationRequest::new(51.5, -0.1);
        assert!(normalize(RawForecast::default(), &location, 24, NOW).is_empty());
    }

    #[test]
    fn test_hourly_only_payload() {
        let mut payload = payload_with_hours(4);
        payload.current = None;

        let location = LocationRequest::new(51.5, -0.1);
        let points = normalize(payload, &location, 24, NOW);

        assert_eq!(points.len(), 4);
        assert_eq!(points[0].timestamp, NOW + HOUR_SECS);
    }

    #[test]
    fn test_location_name_propagates() {
        let named = LocationRequest::named(51.5, -0.1, "London");
        let points = normalize(payload_with_hours(1), &named, 24, NOW);
        assert!(points.iter().all(|p| p.location_name == "London"));

        let unnamed = LocationRequest::new(51.5, -0.1);
        let points = normalize(payload_with_hours(1), &unnamed, 24, NOW);
        assert!(points.iter().all(|p| p.location_name == UNKNOWN_LOCATION));
    }

    #[test]
    fn test_zero_max_points() {
        let location = LocationRequest::new(51.5, -0.1);
        assert!(normalize(payload_with_hours(4), &location, 0, NOW).is_empty());
    }
}
