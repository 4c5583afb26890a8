//! Upstream weather provider adapters
//!
//! This crate talks to the external forecast provider and converts its
//! heterogeneous response shapes into the uniform point records the rest
//! of the pipeline works with. Failures stay behind this boundary as
//! typed errors; nothing transport-specific leaks to callers.

pub mod client;
pub mod normalize;
pub mod payload;
pub mod simulator;

pub use client::*;
pub use normalize::*;
pub use payload::*;
pub use simulator::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport failure, timeout or non-success status from the provider
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// Request rejected before any network call was made
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Trait for forecast providers
#[async_trait::async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Provider name/identifier
    fn name(&self) -> &str;

    /// Fetch the current reading and hourly forecast for a location.
    ///
    /// Single attempt per call; the caller decides whether to retry.
    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        horizon_hours: u32,
    ) -> UpstreamResult<RawForecast>;
}
