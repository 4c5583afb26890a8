//! Open-Meteo HTTP client

use crate::{ForecastProvider, RawForecast, UpstreamError, UpstreamResult};
use std::time::Duration;
use tracing::debug;

/// Default provider endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Default bound on one upstream request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const FIELDS: &str = "temperature_2m,relative_humidity_2m,surface_pressure,\
wind_speed_10m,precipitation,wind_direction_10m,cloud_cover,visibility,\
uv_index,apparent_temperature,dew_point_2m";

/// HTTP adapter for the Open-Meteo forecast API.
///
/// One attempt per call, bounded by a fixed request timeout. Transport
/// errors and non-success statuses surface as `UpstreamError::Unavailable`.
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> UpstreamResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn with_defaults() -> UpstreamResult<Self> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }
}

/// Contract-level input validation shared by every provider
pub fn validate_request(latitude: f64, longitude: f64, horizon_hours: u32) -> UpstreamResult<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(UpstreamError::InvalidRequest(format!(
            "latitude {latitude} outside [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(UpstreamError::InvalidRequest(format!(
            "longitude {longitude} outside [-180, 180]"
        )));
    }
    if horizon_hours < 1 {
        return Err(UpstreamError::InvalidRequest(
            "horizon must be at least one hour".to_string(),
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl ForecastProvider for OpenMeteoClient {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        horizon_hours: u32,
    ) -> UpstreamResult<RawForecast> {
        validate_request(latitude, longitude, horizon_hours)?;

        let forecast_days = (horizon_hours / 24 + 1).max(1);

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", FIELDS.to_string()),
                ("hourly", FIELDS.to_string()),
                ("forecast_days", forecast_days.to_string()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "provider returned status {status}"
            )));
        }

        let payload = response
            .json::<RawForecast>()
            .await
            .map_err(|e| UpstreamError::Unavailable(format!("malformed response: {e}")))?;

        debug!(
            latitude,
            longitude,
            horizon_hours,
            has_current = payload.current.is_some(),
            hourly_len = payload.hourly.as_ref().map(|h| h.len()).unwrap_or(0),
            "fetched forecast"
        );
        Ok(payload)
    }
}
