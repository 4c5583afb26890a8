//! Simulated forecast provider for tests and offline runs

use crate::client::validate_request;
use crate::payload::{CurrentConditions, HourlySeries, RawForecast};
use crate::{ForecastProvider, UpstreamResult};
use chrono::{DateTime, Utc};

/// Deterministic synthetic provider.
///
/// Generates plausible readings from a seed, so two providers with the
/// same seed produce identical payloads. Useful for integration tests and
/// for running the server without network access.
pub struct SimulatedProvider {
    seed: i64,
    produce_empty: bool,
}

impl SimulatedProvider {
    pub fn new(seed: i64) -> Self {
        Self {
            seed,
            produce_empty: false,
        }
    }

    /// Provider that always answers with an empty payload
    pub fn empty() -> Self {
        Self {
            seed: 0,
            produce_empty: true,
        }
    }

    fn variation(&self, index: i64) -> f64 {
        // Same trick as a pseudo-random station: fold the counter into a
        // small signed offset
        (((self.seed + index * 37) % 100) as f64 / 10.0) - 5.0
    }

    fn generate(&self, horizon_hours: u32) -> RawForecast {
        let base_time = DateTime::from_timestamp(self.seed.max(0), 0).unwrap_or_else(Utc::now);

        let current = CurrentConditions {
            temperature_2m: Some(20.0 + self.variation(0)),
            relative_humidity_2m: Some(65.0 + self.variation(1)),
            surface_pressure: Some(1013.25 + self.variation(2) * 2.0),
            wind_speed_10m: Some(5.0 + self.variation(3).abs()),
            precipitation: Some(0.0),
            ..Default::default()
        };

        let hours = horizon_hours as i64;
        let hourly = HourlySeries {
            time: (0..hours)
                .map(|i| {
                    (base_time + chrono::Duration::hours(i + 1))
                        .format("%Y-%m-%dT%H:%M")
                        .to_string()
                })
                .collect(),
            temperature_2m: (0..hours).map(|i| Some(20.0 + self.variation(i))).collect(),
            relative_humidity_2m: (0..hours)
                .map(|i| Some(65.0 + self.variation(i + 7)))
                .collect(),
            surface_pressure: (0..hours)
                .map(|i| Some(1013.25 + self.variation(i + 13) * 2.0))
                .collect(),
            wind_speed_10m: (0..hours)
                .map(|i| Some(5.0 + self.variation(i + 19).abs()))
                .collect(),
            precipitation: (0..hours)
                .map(|i| Some(self.variation(i + 23).max(0.0) / 2.0))
                .collect(),
            ..Default::default()
        };

        RawForecast {
            current: Some(current),
            hourly: Some(hourly),
        }
    }
}

#[async_trait::async_trait]
impl ForecastProvider for SimulatedProvider {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        horizon_hours: u32,
    ) -> UpstreamResult<RawForecast> {
        validate_request(latitude, longitude, horizon_hours)?;
        if self.produce_empty {
            return Ok(RawForecast::default());
        }
        Ok(self.generate(horizon_hours))
    }
}
